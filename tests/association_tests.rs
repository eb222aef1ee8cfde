//! Integration tests for associations.
//!
//! These tests drive `has_many`, `has_one` and `belongs_to` through an
//! in-memory transport that records every request, so they can assert both
//! the returned values and whether a request was made at all.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rest_model::clients::HttpMethod;
use rest_model::{
    AssociationDecl, AttrValue, Model, ModelConfig, ModelRegistry, Params, ResourceError,
    RestError, Transport,
};
use serde_json::{json, Map, Value};

// ============================================================================
// Test Transport
// ============================================================================

#[derive(Default)]
struct StubTransport {
    responses: HashMap<String, Value>,
    fetched: Mutex<Vec<(String, Params)>>,
    sent: Mutex<Vec<(HttpMethod, String, Value)>>,
}

impl StubTransport {
    fn new() -> Self {
        Self::default()
    }

    fn with(mut self, path: &str, body: Value) -> Self {
        self.responses.insert(path.to_string(), body);
        self
    }

    fn fetched(&self) -> Vec<(String, Params)> {
        self.fetched.lock().unwrap().clone()
    }

    fn fetched_paths(&self) -> Vec<String> {
        self.fetched().into_iter().map(|(path, _)| path).collect()
    }

    fn respond(&self, path: &str) -> Result<Value, ResourceError> {
        self.responses.get(path).cloned().ok_or_else(|| {
            ResourceError::Rest(RestError::InvalidPath {
                path: path.to_string(),
            })
        })
    }
}

impl Transport for StubTransport {
    async fn fetch(&self, path: &str, params: &Params) -> Result<Value, ResourceError> {
        self.fetched
            .lock()
            .unwrap()
            .push((path.to_string(), params.clone()));
        self.respond(path)
    }

    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Value,
    ) -> Result<Value, ResourceError> {
        self.sent
            .lock()
            .unwrap()
            .push((method, path.to_string(), body));
        self.respond(path)
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn registry() -> Arc<ModelRegistry> {
    let mut registry = ModelRegistry::new();
    registry
        .register(
            ModelConfig::builder("Foo::User")
                .association(AssociationDecl::has_many("comments"))
                .association(AssociationDecl::has_one("role"))
                .association(AssociationDecl::belongs_to("organization"))
                .association(AssociationDecl::has_many("posts").class_name("Foo::Missing")),
        )
        .unwrap();
    registry
        .register(ModelConfig::builder("Foo::Comment").request_new_object_on_build(true))
        .unwrap();
    registry.register(ModelConfig::builder("Foo::Role")).unwrap();
    registry
        .register(ModelConfig::builder("Foo::Organization").parse_root_in_json(true))
        .unwrap();
    registry.into_shared()
}

fn users() -> Model {
    registry().model("Foo::User").unwrap()
}

fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn params(value: Value) -> Params {
    object(value)
}

// ============================================================================
// has_many Tests
// ============================================================================

#[tokio::test]
async fn test_has_many_fetches_from_parent_member_path() {
    let transport = StubTransport::new().with(
        "users/1/comments",
        json!([{"id": 2, "body": "Tobias, you blow hard!"}, {"id": 3, "body": "I wish I could"}]),
    );
    let user = users().instantiate(object(json!({"id": 1, "fullname": "Tobias Fünke"})));

    let mut comments = user.association("comments").unwrap();
    let loaded = comments.load(&transport).await.unwrap().clone();

    let collection = loaded.as_collection().unwrap();
    assert_eq!(collection.len(), 2);
    assert_eq!(collection[0].model().name(), "Foo::Comment");
    assert_eq!(collection[1].get("body"), Some(&AttrValue::Json(json!("I wish I could"))));
    assert_eq!(transport.fetched_paths(), vec!["users/1/comments"]);
}

#[tokio::test]
async fn test_empty_has_many_returns_default_without_request() {
    let transport = StubTransport::new();
    let user = users().instantiate(object(json!({"id": 1, "comments": []})));

    let mut comments = user.association("comments").unwrap();
    let first = comments.load(&transport).await.unwrap().clone();
    let second = comments.reload(&transport).await.unwrap().clone();

    assert_eq!(first, second);
    assert!(first.as_collection().unwrap().is_empty());
    assert!(transport.fetched().is_empty());
}

#[tokio::test]
async fn test_nested_payload_is_used_without_request() {
    let transport = StubTransport::new();
    let user = users().instantiate(object(json!({
        "id": 1,
        "comments": [{"id": 2, "body": "Tobias, you blow hard!"}],
    })));

    let mut comments = user.association("comments").unwrap();
    let loaded = comments.load(&transport).await.unwrap();

    assert_eq!(loaded.as_collection().unwrap().len(), 1);
    assert!(transport.fetched().is_empty());
}

#[tokio::test]
async fn test_unsaved_parent_returns_default_without_request() {
    let transport = StubTransport::new();
    let user = users().build(object(json!({"fullname": "Tobias Fünke"})));

    let mut comments = user.association("comments").unwrap();
    let loaded = comments.load(&transport).await.unwrap();

    assert!(loaded.as_collection().unwrap().is_empty());
    assert!(transport.fetched().is_empty());
}

#[tokio::test]
async fn test_where_merges_params_and_leaves_receiver_untouched() {
    let transport = StubTransport::new().with("users/1/comments", json!([{"id": 2}]));
    let user = users().instantiate(object(json!({"id": 1})));

    let comments = user.association("comments").unwrap();
    let mut approved = comments
        .where_(params(json!({"approved": 1})))
        .where_(params(json!({"locked": 0})));
    approved.load(&transport).await.unwrap();

    assert!(comments.params().is_empty());
    assert!(!comments.is_resolved());
    assert_eq!(
        transport.fetched(),
        vec![(
            "users/1/comments".to_string(),
            params(json!({"approved": 1, "locked": 0}))
        )]
    );
}

#[tokio::test]
async fn test_where_on_loaded_parent_data_forces_request() {
    let transport = StubTransport::new().with("users/1/comments", json!([]));
    let user = users().instantiate(object(json!({
        "id": 1,
        "comments": [{"id": 2}],
    })));

    let comments = user.association("comments").unwrap();
    let mut filtered = comments.where_(params(json!({"approved": 1})));
    let loaded = filtered.load(&transport).await.unwrap();

    assert!(loaded.as_collection().unwrap().is_empty());
    assert_eq!(transport.fetched_paths(), vec!["users/1/comments"]);
}

#[tokio::test]
async fn test_proxy_caches_until_reload() {
    let transport = StubTransport::new().with("users/1/comments", json!([{"id": 2}]));
    let user = users().instantiate(object(json!({"id": 1})));

    let mut comments = user.association("comments").unwrap();
    assert!(!comments.is_resolved());

    comments.load(&transport).await.unwrap();
    comments.load(&transport).await.unwrap();
    assert!(comments.is_resolved());
    assert_eq!(transport.fetched().len(), 1);

    let unchanged = comments.where_(Params::new());
    assert!(unchanged.is_resolved());

    comments.reload(&transport).await.unwrap();
    assert_eq!(transport.fetched().len(), 2);
}

#[tokio::test]
async fn test_repeated_access_reuses_value_stored_on_parent() {
    let transport = StubTransport::new().with("users/1/comments", json!([{"id": 2}]));
    let user = users().instantiate(object(json!({"id": 1})));

    let first = user
        .association("comments")
        .unwrap()
        .load(&transport)
        .await
        .unwrap()
        .clone();

    let mut again = user.association("comments").unwrap();
    assert_eq!(again.current(), first);
    let second = again.load(&transport).await.unwrap().clone();

    assert_eq!(first, second);
    assert_eq!(transport.fetched().len(), 1);
}

#[tokio::test]
async fn test_stored_values_are_kept_per_params() {
    let transport = StubTransport::new().with("users/1/comments", json!([{"id": 2}]));
    let user = users().instantiate(object(json!({"id": 1})));

    let mut all = user.association("comments").unwrap();
    all.load(&transport).await.unwrap();

    let approved = || {
        user.association("comments")
            .unwrap()
            .where_(params(json!({"approved": 1})))
    };
    approved().load(&transport).await.unwrap();
    approved().load(&transport).await.unwrap();

    assert_eq!(
        transport.fetched(),
        vec![
            ("users/1/comments".to_string(), Params::new()),
            ("users/1/comments".to_string(), params(json!({"approved": 1}))),
        ]
    );
}

#[tokio::test]
async fn test_reload_replaces_value_stored_on_parent() {
    let transport = StubTransport::new().with("users/1/comments", json!([{"id": 2}]));
    let user = users().instantiate(object(json!({"id": 1})));

    user.association("comments")
        .unwrap()
        .load(&transport)
        .await
        .unwrap();
    user.association("comments")
        .unwrap()
        .reload(&transport)
        .await
        .unwrap();
    user.association("comments")
        .unwrap()
        .load(&transport)
        .await
        .unwrap();

    assert_eq!(transport.fetched().len(), 2);
}

#[tokio::test]
async fn test_mutating_parent_drops_stored_values() {
    let transport = StubTransport::new().with("users/1/comments", json!([{"id": 2}]));
    let mut user = users().instantiate(object(json!({"id": 1})));

    user.association("comments")
        .unwrap()
        .load(&transport)
        .await
        .unwrap();
    user.set("fullname", json!("Tobias Fünke"));
    user.association("comments")
        .unwrap()
        .load(&transport)
        .await
        .unwrap();

    assert_eq!(transport.fetched().len(), 2);
}

#[tokio::test]
async fn test_cloned_parent_keeps_independent_stored_values() {
    let transport = StubTransport::new().with("users/1/comments", json!([{"id": 2}]));
    let user = users().instantiate(object(json!({"id": 1})));

    user.association("comments")
        .unwrap()
        .load(&transport)
        .await
        .unwrap();
    let mut copy = user.clone();
    copy.set("fullname", json!("Lindsay Fünke"));

    user.association("comments")
        .unwrap()
        .load(&transport)
        .await
        .unwrap();
    assert_eq!(transport.fetched().len(), 1);

    copy.association("comments")
        .unwrap()
        .load(&transport)
        .await
        .unwrap();
    assert_eq!(transport.fetched().len(), 2);
}

#[tokio::test]
async fn test_new_resource_returns_equal_defaults_without_request() {
    let transport = StubTransport::new();
    let user = users().new_resource();

    let mut comments = user.association("comments").unwrap();
    let first = comments.load(&transport).await.unwrap().clone();
    let second = comments.reload(&transport).await.unwrap().clone();

    assert_eq!(first, second);
    assert!(first.as_collection().unwrap().is_empty());
    assert!(transport.fetched().is_empty());
}

#[tokio::test]
async fn test_current_does_not_request() {
    let user = users().instantiate(object(json!({"id": 1})));
    let comments = user.association("comments").unwrap();

    assert!(comments.current().as_collection().unwrap().is_empty());
}

#[tokio::test]
async fn test_find_blank_id_returns_none_without_request() {
    let transport = StubTransport::new();
    let user = users().instantiate(object(json!({"id": 1})));
    let comments = user.association("comments").unwrap();

    assert!(comments.find(&transport, Value::Null).await.unwrap().is_none());
    assert!(comments.find(&transport, "").await.unwrap().is_none());
    assert!(transport.fetched().is_empty());
}

#[tokio::test]
async fn test_find_fetches_member_under_parent() {
    let transport = StubTransport::new().with(
        "users/1/comments/2",
        json!({"id": 2, "body": "Tobias, you blow hard!"}),
    );
    let user = users().instantiate(object(json!({"id": 1})));
    let comments = user.association("comments").unwrap();

    let comment = comments.find(&transport, 2).await.unwrap().unwrap();

    assert_eq!(comment.id(), Some(&json!(2)));
    assert!(!comment.attributes().is_dirty());
}

#[tokio::test]
async fn test_build_sets_parent_key_and_requests_template() {
    let transport = StubTransport::new().with(
        "comments/new",
        json!({"body": "Hello", "user_id": 1, "approved": false}),
    );
    let user = users().instantiate(object(json!({"id": 1})));
    let comments = user.association("comments").unwrap();

    let comment = comments
        .build(&transport, object(json!({"body": "Hello"})))
        .await
        .unwrap();

    assert!(comment.is_new());
    assert_eq!(comment.get("approved"), Some(&AttrValue::Json(json!(false))));
    assert_eq!(
        transport.fetched(),
        vec![(
            "comments/new".to_string(),
            params(json!({"body": "Hello", "user_id": 1}))
        )]
    );
}

// ============================================================================
// has_one / belongs_to Tests
// ============================================================================

#[tokio::test]
async fn test_has_one_fetches_single_resource() {
    let transport = StubTransport::new().with("users/1/role", json!({"id": 3, "body": "Admin"}));
    let user = users().instantiate(object(json!({"id": 1})));

    let mut role = user.association("role").unwrap();
    let loaded = role.load(&transport).await.unwrap();

    let role = loaded.as_resource().unwrap();
    assert_eq!(role.model().name(), "Foo::Role");
    assert_eq!(role.get("body"), Some(&AttrValue::Json(json!("Admin"))));
}

#[tokio::test]
async fn test_belongs_to_uses_foreign_key() {
    let transport = StubTransport::new().with(
        "organizations/2",
        json!({"organization": {"id": 2, "name": "Bluth Company"}}),
    );
    let user = users().instantiate(object(json!({"id": 1, "organization_id": 2})));

    let mut organization = user.association("organization").unwrap();
    let loaded = organization.load(&transport).await.unwrap();

    let organization = loaded.as_resource().unwrap();
    assert_eq!(organization.id(), Some(&json!(2)));
    assert_eq!(
        organization.get("name"),
        Some(&AttrValue::Json(json!("Bluth Company")))
    );
}

#[tokio::test]
async fn test_belongs_to_without_foreign_key_returns_null() {
    let transport = StubTransport::new();
    let user = users().instantiate(object(json!({"id": 1, "organization_id": null})));

    let mut organization = user.association("organization").unwrap();
    let loaded = organization.load(&transport).await.unwrap();

    assert_eq!(loaded, &AttrValue::Json(Value::Null));
    assert!(transport.fetched().is_empty());
}

// ============================================================================
// Nested Assignment and Lookup Tests
// ============================================================================

#[test]
fn test_nested_assignment_creates_then_merges() {
    let mut user = users().instantiate(object(json!({"id": 1})));

    user.assign_nested_attributes("role", object(json!({"body": "Admin"})))
        .unwrap();
    assert!(!user.attributes().is_changed("role"));

    user.assign_nested_attributes("role", object(json!({"body": "Owner", "id": 3})))
        .unwrap();

    let role = user.get("role").and_then(AttrValue::as_resource).unwrap();
    assert_eq!(role.get("body"), Some(&AttrValue::Json(json!("Owner"))));
    assert_eq!(role.id(), Some(&json!(3)));
}

#[test]
fn test_unknown_association_is_reported() {
    let user = users().instantiate(object(json!({"id": 1})));

    assert!(matches!(
        user.association("friends"),
        Err(ResourceError::UnknownAssociation { ref name, .. }) if name == "friends"
    ));
}

#[test]
fn test_unregistered_target_is_reported_on_access() {
    let user = users().instantiate(object(json!({"id": 1})));

    assert!(matches!(
        user.association("posts"),
        Err(ResourceError::UnknownModel { ref name }) if name == "Foo::Missing"
    ));
}
