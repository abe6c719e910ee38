//! Hydration tests against a mocked Scratch API.
//!
//! Request counts are asserted with wiremock expectations, which are
//! verified when the mock server is dropped.

use std::time::Duration;

use scratchapi::{
    Classroom, Comment, CommentKey, CommentThread, Endpoints, Entity, ErrorKind, Hydrate,
    ListParams, Project, ScratchClient, ScratchError, Studio, User,
};
use serde_json::{json, Value};
use wiremock::matchers::{any, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ScratchClient {
    ScratchClient::with_endpoints(Endpoints::all(&server.uri()).unwrap()).unwrap()
}

fn project_json(id: u64, author: &str, parent: Option<u64>, root: Option<u64>) -> Value {
    json!({
        "id": id,
        "title": format!("Project {id}"),
        "description": "notes",
        "instructions": "click the flag",
        "visibility": "visible",
        "public": true,
        "comments_allowed": true,
        "author": {"id": 1, "username": author},
        "image": format!("https://cdn2.scratch.mit.edu/get_image/project/{id}_480x360.png"),
        "history": {
            "created": "2020-01-01T00:00:00.000Z",
            "modified": "2020-01-02T00:00:00.000Z",
            "shared": "2020-01-03T00:00:00.000Z"
        },
        "stats": {"views": 10, "loves": 2, "favorites": 1, "remixes": 0},
        "remix": {"parent": parent, "root": root},
        "project_token": "tok123"
    })
}

fn user_json(username: &str) -> Value {
    json!({
        "id": 42,
        "username": username,
        "scratchteam": false,
        "history": {"joined": "2015-06-01T00:00:00.000Z"},
        "profile": {
            "images": {"90x90": "https://cdn2.scratch.mit.edu/get_image/user/42_90x90.png"},
            "status": "about me",
            "bio": "working on games",
            "country": "Canada"
        }
    })
}

async fn mount_json(server: &MockServer, route: &str, body: Value, expected: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_project_hydration_fetches_author_and_parent_once() {
    let server = MockServer::start().await;
    mount_json(&server, "/projects/1", project_json(1, "alice", Some(2), Some(2)), 1).await;
    mount_json(&server, "/users/alice", user_json("alice"), 1).await;
    mount_json(&server, "/projects/2", project_json(2, "bob", None, None), 1).await;
    // The parent is hydrated with its own fields only.
    mount_json(&server, "/users/bob", user_json("bob"), 0).await;

    let client = client_for(&server);
    let project = Project::fetch(&client, 1).await.unwrap();

    let detail = project.detail().unwrap();
    assert_eq!(detail.title, "Project 1");
    assert_eq!(detail.notes(), "notes");
    assert!(detail.author.is_hydrated());
    assert_eq!(detail.author.detail().unwrap().about_me(), "about me");

    let parent = detail.parent.as_ref().unwrap();
    assert_eq!(parent.id(), 2);
    assert!(parent.is_hydrated());
    let parent_detail = parent.detail().unwrap();
    assert!(!parent_detail.author.is_hydrated());
    assert!(parent_detail.parent.is_none());
}

#[tokio::test]
async fn test_remix_root_is_never_fetched() {
    let server = MockServer::start().await;
    mount_json(&server, "/projects/10", project_json(10, "alice", Some(11), Some(3)), 1).await;
    mount_json(&server, "/users/alice", user_json("alice"), 1).await;
    mount_json(&server, "/projects/11", project_json(11, "alice", Some(3), Some(3)), 1).await;
    mount_json(&server, "/projects/3", project_json(3, "carol", None, None), 0).await;

    let client = client_for(&server);
    let project = Project::fetch(&client, 10).await.unwrap();

    let root = project.detail().unwrap().root.as_ref().unwrap();
    assert_eq!(root, &Project::shallow(3));
    assert!(!root.is_hydrated());
}

#[tokio::test]
async fn test_null_remix_parent_is_none() {
    let server = MockServer::start().await;
    mount_json(&server, "/projects/1", project_json(1, "alice", None, None), 1).await;
    mount_json(&server, "/users/alice", user_json("alice"), 1).await;

    let client = client_for(&server);
    let project = Project::fetch(&client, 1).await.unwrap();

    let detail = project.detail().unwrap();
    assert!(detail.parent.is_none());
    assert!(detail.root.is_none());
    assert!(!detail.is_remix());
}

#[tokio::test]
async fn test_shallow_references_make_no_requests() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let project = Project::shallow(104);
    let user = User::shallow("griffpatch".into());
    let links = project.links(client.endpoints());

    assert!(!project.is_hydrated());
    assert!(!user.is_hydrated());
    assert!(links.url.ends_with("/projects/104"));
}

#[tokio::test]
async fn test_equality_ignores_hydration_state() {
    let server = MockServer::start().await;
    mount_json(&server, "/users/alice", user_json("alice"), 1).await;

    let client = client_for(&server);
    let hydrated = User::fetch(&client, "alice".into()).await.unwrap();

    assert!(hydrated.is_hydrated());
    assert_eq!(hydrated, User::shallow("ALICE".into()));
}

#[tokio::test]
async fn test_hydrate_is_idempotent_and_refetches() {
    let server = MockServer::start().await;
    mount_json(&server, "/studios/7", json!({
        "id": 7,
        "title": "Cats",
        "host": 42,
        "description": "all cats",
        "open_to_all": true,
        "stats": {"comments": 1, "followers": 2, "managers": 3, "projects": 4}
    }), 2)
    .await;

    let client = client_for(&server);
    let mut studio = Studio::shallow(7);
    studio.hydrate(&client).await.unwrap();
    let first = studio.detail().cloned();
    studio.hydrate(&client).await.unwrap();

    assert_eq!(studio.detail().cloned(), first);
    assert_eq!(studio.detail().unwrap().host, Some(42));
    assert_eq!(studio.detail().unwrap().stats.projects, 4);
    assert!(studio.detail().unwrap().url.ends_with("/studios/7"));
}

#[tokio::test]
async fn test_missing_studio_host_is_none() {
    let server = MockServer::start().await;
    mount_json(&server, "/studios/7", json!({"id": 7, "title": "t"}), 1).await;

    let client = client_for(&server);
    let studio = Studio::fetch(&client, 7).await.unwrap();

    let detail = studio.detail().unwrap();
    assert_eq!(detail.title, "t");
    assert_eq!(detail.host, None);
}

#[tokio::test]
async fn test_not_found_is_remote_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects/999"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"code": "NotFound", "message": ""})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut project = Project::shallow(999);
    let err = project.hydrate(&client).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Remote);
    assert!(err.is_not_found());
    assert!(!project.is_hydrated());
}

#[tokio::test]
async fn test_error_code_in_successful_response() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/users/ghost",
        json!({"code": "NotFound", "message": "no such user"}),
        1,
    )
    .await;

    let client = client_for(&server);
    let err = User::fetch(&client, "ghost".into()).await.unwrap_err();

    match err {
        ScratchError::Remote { code, message } => {
            assert_eq!(code, "NotFound");
            assert_eq!(message, "no such user");
        }
        other => panic!("Expected remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    let client =
        ScratchClient::with_endpoints(Endpoints::all("http://127.0.0.1:1").unwrap()).unwrap();
    let err = Project::fetch(&client, 1).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_malformed_body_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/studios/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = Studio::fetch(&client, 1).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_failed_author_fetch_leaves_project_unhydrated() {
    let server = MockServer::start().await;
    mount_json(&server, "/projects/1", project_json(1, "alice", None, None), 1).await;
    Mock::given(method("GET"))
        .and(path("/users/alice"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut project = Project::shallow(1);
    let err = project.hydrate(&client).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(!project.is_hydrated());
}

#[tokio::test]
async fn test_failed_rehydration_keeps_previous_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("alice")))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/alice"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut user = User::shallow("alice".into());
    user.hydrate(&client).await.unwrap();
    let before = user.detail().cloned().unwrap();

    assert!(user.hydrate(&client).await.is_err());
    assert_eq!(user.detail(), Some(&before));
}

#[tokio::test]
async fn test_hydrate_within_times_out_without_side_effects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(user_json("slow"))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut user = User::shallow("slow".into());
    let err = user
        .hydrate_within(&client, Duration::from_millis(50))
        .await
        .unwrap_err();

    assert!(matches!(err, ScratchError::Timeout(_)));
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(!user.is_hydrated());
}

#[tokio::test]
async fn test_derived_links_match_site_layout() {
    let server = MockServer::start().await;
    mount_json(&server, "/projects/123", project_json(123, "alice", None, None), 1).await;
    mount_json(&server, "/users/alice", user_json("alice"), 1).await;

    let client = client_for(&server);
    let project = Project::fetch(&client, 123).await.unwrap();
    let links = &project.detail().unwrap().links;
    let site = server.uri();

    assert_eq!(links.url, format!("{site}/projects/123"));
    assert_eq!(links.see_inside_url, format!("{site}/projects/123#editor"));
    assert_eq!(links.embed_url, format!("{site}/projects/embed/123"));
    assert_eq!(links.preview_url, format!("{site}/#123"));
    assert!(links
        .embed_html
        .contains(&format!("src=\"{site}/projects/embed/123?autostart=false\"")));
}

#[tokio::test]
async fn test_classroom_hydrates_educator() {
    let server = MockServer::start().await;
    mount_json(&server, "/classrooms/9", json!({
        "id": 9,
        "title": "Intro",
        "description": "loops and events",
        "status": "week 2",
        "date_start": "2019-09-01T00:00:00.000Z",
        "date_end": null,
        "images": {},
        "educator": {"id": 3, "username": "teacher1"}
    }), 1)
    .await;
    mount_json(&server, "/users/teacher1", user_json("teacher1"), 1).await;

    let client = client_for(&server);
    let classroom = Classroom::fetch(&client, 9).await.unwrap();
    let detail = classroom.detail().unwrap();

    assert_eq!(detail.about_class(), "week 2");
    assert_eq!(detail.what_were_working_on(), "loops and events");
    assert!(detail.teacher().is_hydrated());
}

#[tokio::test]
async fn test_comment_hydrates_author() {
    let server = MockServer::start().await;
    mount_json(&server, "/studios/5/comments/11", json!({
        "id": 11,
        "parent_id": 10,
        "commentee_id": 42,
        "content": "nice studio",
        "datetime_created": "2021-03-01T10:00:00.000Z",
        "datetime_modified": "2021-03-01T10:00:00.000Z",
        "visibility": "visible",
        "author": {"id": 1, "username": "alice"},
        "reply_count": 0
    }), 1)
    .await;
    mount_json(&server, "/users/alice", user_json("alice"), 1).await;
    mount_json(&server, "/studios/5/comments/10", json!({}), 0).await;

    let client = client_for(&server);
    let key = CommentKey {
        thread: CommentThread::Studio { studio_id: 5 },
        id: 11,
    };
    let comment = Comment::fetch(&client, key).await.unwrap();

    let detail = comment.detail().unwrap();
    assert_eq!(detail.content, "nice studio");
    assert!(detail.author.is_hydrated());

    let parent = comment.parent().unwrap();
    assert_eq!(parent.id(), 10);
    assert!(!parent.is_hydrated());
}

#[tokio::test]
async fn test_replies_are_listed_on_demand_under_parent_thread() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/studios/5/comments/10/replies"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 11, "parent_id": 10},
            {"id": 12, "parent_id": 10}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/studios/5/comments/10/replies"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let thread = CommentThread::Studio { studio_id: 5 };
    let comment = Comment::shallow(CommentKey {
        thread: thread.clone(),
        id: 10,
    });

    let replies = comment
        .replies(&client, ListParams::with_limit(2))
        .collect_all()
        .await
        .unwrap();

    assert_eq!(replies.len(), 2);
    for reply in &replies {
        assert_eq!(reply.thread(), &thread);
        assert!(!reply.is_hydrated());
        assert_eq!(reply.parent(), Some(comment.clone()));
    }
    assert_eq!(
        replies[1].key(),
        &CommentKey {
            thread: thread.clone(),
            id: 12
        }
    );
}

#[tokio::test]
async fn test_project_comments_use_author_path() {
    let server = MockServer::start().await;
    mount_json(&server, "/projects/1", project_json(1, "alice", None, None), 1).await;
    mount_json(&server, "/users/alice", user_json("alice"), 1).await;
    Mock::given(method("GET"))
        .and(path("/users/alice/projects/1/comments"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 5, "parent_id": null}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let project = Project::fetch(&client, 1).await.unwrap();
    let mut comments = project.comments(&client, Default::default()).unwrap();

    let first = comments.next().await.unwrap().unwrap();
    assert_eq!(first.id(), 5);
    assert_eq!(
        first.thread(),
        &CommentThread::Project {
            author: "alice".into(),
            project_id: 1
        }
    );
}

#[tokio::test]
async fn test_download_json_sends_project_token() {
    let server = MockServer::start().await;
    mount_json(&server, "/projects/1", project_json(1, "alice", None, None), 1).await;
    mount_json(&server, "/users/alice", user_json("alice"), 1).await;
    Mock::given(method("GET"))
        .and(path("/1"))
        .and(query_param("token", "tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"targets":[]}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let project = Project::fetch(&client, 1).await.unwrap();

    let mut buffer = Vec::new();
    let written = project.download_json(&client, &mut buffer).await.unwrap();

    assert_eq!(written, 14);
    assert_eq!(buffer, br#"{"targets":[]}"#);
}

#[tokio::test]
async fn test_download_thumbnail_requires_image() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let mut buffer = Vec::new();
    let err = Project::shallow(1)
        .download_thumbnail(&client, &mut buffer)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(buffer.is_empty());
}
