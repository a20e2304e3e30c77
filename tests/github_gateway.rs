use pr_comment_resource::{
    CheckError, CheckRequest, Forge, GitHub, PullRequest, Source, Version, check,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const REPO_PATH: &str = "/api/v3/repos/owner/repo";

fn source_for(server: &MockServer) -> Source {
    Source {
        repository: "owner/repo".to_string(),
        access_token: Some("valid-token".to_string()),
        github_endpoint: Some(format!("{}/api/v3", server.uri())),
        ..Source::default()
    }
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "message": "Not Found",
        "documentation_url": "https://docs.github.com/rest"
    }))
}

#[tokio::test]
async fn test_list_pull_requests_route_and_conversion() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO_PATH}/pulls")))
        .and(query_param("state", "all"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "number": 1,
                "state": "closed",
                "draft": null,
                "merged_at": "2025-01-02T00:00:00Z",
                "labels": [{ "name": "deploy" }]
            },
            {
                "number": 2,
                "state": "open",
                "draft": true,
                "merged_at": null,
                "labels": []
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let forge = GitHub::from_source(&source_for(&server)).unwrap();
    let pulls = forge.list_pull_requests().await.unwrap();

    assert_eq!(
        pulls,
        vec![
            PullRequest {
                number: 1,
                state: "closed".to_string(),
                merged: true,
                labels: vec!["deploy".to_string()],
                mergeable: None,
                draft: false,
            },
            PullRequest {
                number: 2,
                state: "open".to_string(),
                merged: false,
                labels: vec![],
                mergeable: None,
                draft: true,
            },
        ]
    );
}

#[tokio::test]
async fn test_list_pull_requests_narrows_to_open() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO_PATH}/pulls")))
        .and(query_param("state", "open"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let source = Source {
        states: vec!["open".to_string()],
        ..source_for(&server)
    };
    let forge = GitHub::from_source(&source).unwrap();

    assert!(forge.list_pull_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_pull_request_comments_route_and_conversion() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO_PATH}/issues/7/comments")))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 42,
                "created_at": "2025-01-01T10:00:00Z",
                "body": "/deploy",
                "author_association": "COLLABORATOR"
            },
            {
                "id": 43,
                "created_at": "2025-01-01T11:00:00Z",
                "body": null,
                "author_association": "NONE"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let forge = GitHub::from_source(&source_for(&server)).unwrap();
    let comments = forge.list_pull_request_comments(7).await.unwrap();

    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].id, 42);
    assert_eq!(comments[0].body, "/deploy");
    assert_eq!(comments[0].author_association, "COLLABORATOR");
    assert_eq!(comments[0].created_at.to_rfc3339(), "2025-01-01T10:00:00+00:00");
    assert_eq!(comments[1].body, "");
}

#[tokio::test]
async fn test_get_pull_request_reports_mergeability() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO_PATH}/pulls/7")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "number": 7,
            "state": "open",
            "draft": false,
            "mergeable": true,
            "merged_at": null,
            "labels": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let forge = GitHub::from_source(&source_for(&server)).unwrap();
    let pr = forge.get_pull_request(7).await.unwrap();

    assert_eq!(pr.number, 7);
    assert_eq!(pr.mergeable, Some(true));
}

#[tokio::test]
async fn test_transport_error_carries_github_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO_PATH}/issues/7/comments")))
        .respond_with(not_found())
        .mount(&server)
        .await;

    let forge = GitHub::from_source(&source_for(&server)).unwrap();
    let err = forge.list_pull_request_comments(7).await.unwrap_err();

    match err {
        CheckError::Transport { operation, message } => {
            assert_eq!(operation, "list comments for pull request #7");
            assert!(message.contains("404"), "unexpected message: {message}");
            assert!(message.contains("Not Found"), "unexpected message: {message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_deleted_checkpoint_comment_surfaces_as_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO_PATH}/pulls")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO_PATH}/issues/comments/42")))
        .respond_with(not_found())
        .expect(1)
        .mount(&server)
        .await;

    let forge = GitHub::from_source(&source_for(&server)).unwrap();
    let request = CheckRequest::new(source_for(&server), Some(Version::new("42")));
    let err = check(&request, &forge).await.unwrap_err();

    match err {
        CheckError::CheckpointNotFound { id, cause } => {
            assert_eq!(id, 42);
            assert!(matches!(*cause, CheckError::Transport { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_check_end_to_end_against_api() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO_PATH}/pulls")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "number": 1, "state": "open", "draft": false, "labels": [] }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO_PATH}/issues/1/comments")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 100,
                "created_at": "2025-01-02T00:00:00Z",
                "body": "/deploy",
                "author_association": "MEMBER"
            }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO_PATH}/issues/comments/42")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42,
            "created_at": "2025-01-01T00:00:00Z",
            "body": "/deploy",
            "author_association": "MEMBER"
        })))
        .mount(&server)
        .await;

    let forge = GitHub::from_source(&source_for(&server)).unwrap();
    let request = CheckRequest::new(source_for(&server), Some(Version::new("42")));
    let versions = check(&request, &forge).await.unwrap();

    assert_eq!(versions, vec![Version::new("100"), Version::new("42")]);
}

#[test]
fn test_bad_endpoint_is_client_construction_error() {
    let source = Source {
        repository: "owner/repo".to_string(),
        github_endpoint: Some("not a url".to_string()),
        ..Source::default()
    };

    let err = GitHub::from_source(&source).err().unwrap();

    assert!(
        matches!(err, CheckError::ClientConstruction { .. }),
        "unexpected error: {err:?}"
    );
}

#[test]
fn test_bad_repository_is_client_construction_error() {
    let source = Source {
        repository: "owner-without-name".to_string(),
        ..Source::default()
    };

    let err = GitHub::from_source(&source).err().unwrap();

    assert!(
        matches!(err, CheckError::ClientConstruction { .. }),
        "unexpected error: {err:?}"
    );
}
