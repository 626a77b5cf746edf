use blogdesk_auth::Authority;
use blogdesk_client::{ApiClient, ApiError, BlogPostDraft, BlogPostQuery, SortField, SortOrder, UserRegistration};
use blogdesk_core::{BlogPostId, RoleId, UserId};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ADA_ID: &str = "0b6f4c8e-1d2a-4b3c-8d4e-5f6a7b8c9d0e";
const POST_ID: &str = "3a0f5f5e-8a11-4c1e-9a43-8f1f0e1d2c3b";

fn ada_json() -> serde_json::Value {
    json!({
        "id": ADA_ID,
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.com",
        "roles": [{
            "id": "8b1c0c2e-8a7f-4f49-9d38-3c4d0c1e2f3a",
            "name": "USER",
            "authorities": [{"id": "1e2d3c4b-5a69-4788-9a0b-1c2d3e4f5a6b", "name": "BLOGPOST_CREATE"}]
        }]
    })
}

fn post_json() -> serde_json::Value {
    json!({
        "id": POST_ID,
        "title": "Hello world",
        "text": "A first post with enough text in it.",
        "category": "Technology",
        "author": ada_json(),
        "createdAt": "2024-05-01T10:15:30.123456",
        "updatedAt": "2024-05-01T10:15:30.123456"
    })
}

fn draft() -> BlogPostDraft {
    BlogPostDraft {
        title: "Hello world".to_string(),
        text: "A first post with enough text in it.".to_string(),
        category: "Technology".to_string(),
    }
}

#[tokio::test]
async fn login_returns_principal_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/login"))
        .and(body_json(json!({"email": "ada@example.com", "password": "secret"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Authorization", "Bearer jwt-token")
                .set_body_json(ada_json()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let login = client.login("ada@example.com", "secret").await.unwrap();

    assert_eq!(login.token.as_deref(), Some("Bearer jwt-token"));
    assert_eq!(login.principal.email, "ada@example.com");
    assert_eq!(login.principal.roles[0].authorities[0].name, Authority::BLOGPOST_CREATE);
}

#[tokio::test]
async fn login_rejected_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let err = client.login("ada@example.com", "wrong").await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
}

#[tokio::test]
async fn list_posts_sends_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blogpost"))
        .and(query_param("page", "2"))
        .and(query_param("size", "5"))
        .and(query_param("sortBy", "title"))
        .and(query_param("sortOrder", "asc"))
        .and(query_param("category", "Travel"))
        .and(query_param("authorId", ADA_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [post_json()],
            "totalPages": 3,
            "totalElements": 11,
            "currentPage": 2,
            "pageSize": 5,
            "first": false,
            "last": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let query = BlogPostQuery::default()
        .page(2)
        .sort(SortField::Title, SortOrder::Asc)
        .category("Travel")
        .author(ADA_ID.parse::<UserId>().unwrap());
    let page = client.list_posts(&query).await.unwrap();

    assert_eq!(page.content.len(), 1);
    assert_eq!(page.total_elements, 11);
    assert!(page.has_previous());
    assert!(!page.has_next());
}

#[tokio::test]
async fn create_post_sends_bearer_token_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/blogpost"))
        .and(header("Authorization", "Bearer jwt-token"))
        .and(body_json(json!({
            "title": "Hello world",
            "text": "A first post with enough text in it.",
            "category": "Technology"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(post_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::with_token(server.uri(), "jwt-token");
    let post = client.create_post(&draft()).await.unwrap();
    assert_eq!(post.id, Some(POST_ID.parse::<BlogPostId>().unwrap()));
}

#[tokio::test]
async fn forbidden_carries_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("/blogpost/{POST_ID}")))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Access denied"})))
        .mount(&server)
        .await;

    let client = ApiClient::with_token(server.uri(), "Bearer jwt-token");
    let err = client
        .update_post(POST_ID.parse().unwrap(), &draft())
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::Forbidden("Access denied".to_string()));
}

#[tokio::test]
async fn admin_routes_use_admin_paths() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("/blogpost/admin/{POST_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(post_json()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/blogpost/admin/{POST_ID}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::with_token(server.uri(), "t");
    let id: BlogPostId = POST_ID.parse().unwrap();
    client.admin_update_post(id, &draft()).await.unwrap();
    client.admin_delete_post(id).await.unwrap();
}

#[tokio::test]
async fn missing_post_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/blogpost/{POST_ID}")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let err = client.get_post(POST_ID.parse().unwrap()).await.unwrap_err();
    assert_eq!(err, ApiError::NotFound);
}

#[tokio::test]
async fn server_error_keeps_status_and_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .mount(&server)
        .await;

    let client = ApiClient::with_token(server.uri(), "t");
    let err = client.list_users().await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Api { status: 500, message: "database unavailable".to_string() }
    );
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let client = ApiClient::with_token(server.uri(), "t");
    let err = client.list_roles().await.unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)));
}

#[tokio::test]
async fn register_and_delete_user() {
    let server = MockServer::start().await;
    let role_id = RoleId::new();
    Mock::given(method("POST"))
        .and(path("/user/register"))
        .and(body_json(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "password": "pass",
            "roleIds": [role_id.to_string()]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(ada_json()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/user/{ADA_ID}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::with_token(server.uri(), "t");
    let user = client
        .register_user(&UserRegistration {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "pass".to_string(),
            role_ids: vec![role_id],
        })
        .await
        .unwrap();
    let id = user.id.unwrap();
    client.delete_user(id).await.unwrap();
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    // Bind and drop a listener to get a port nothing listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let client = ApiClient::new(format!("http://127.0.0.1:{port}"));
    let err = client.list_roles().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
}
