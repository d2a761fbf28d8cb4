mod common;

use actix_web::http::{header, StatusCode};
use actix_web::{test, App};
use pretty_assertions::assert_eq;
use serde_json::json;
use taskhub::routes;
use uuid::Uuid;

use common::{app_state, bearer, seed_user, send};

#[test_log::test(actix_rt::test)]
async fn test_task_crud_flow() {
    let state = app_state();
    let owner = seed_user(&state, "crud_user@example.com", false).await;
    let auth = bearer(&state, &owner);
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(routes::configure_app),
    )
    .await;

    // 1. Create; any owner in the body is ignored
    let req = test::TestRequest::post()
        .uri("/api/v1/tasks")
        .insert_header((header::AUTHORIZATION, auth.clone()))
        .set_json(&json!({
            "title": "CRUD Test Task",
            "description": "A task for CRUD testing",
            "owner_id": Uuid::new_v4()
        }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    assert_eq!(body["title"], "CRUD Test Task");
    assert_eq!(body["status"], "pending");
    assert_eq!(body["owner_id"], owner.id.to_string());
    let task_id = body["id"].as_str().unwrap().to_string();

    // 2. Read
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/tasks/{}", task_id))
        .insert_header((header::AUTHORIZATION, auth.clone()))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "A task for CRUD testing");

    // 3. Partial update; null clears the description
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/tasks/{}", task_id))
        .insert_header((header::AUTHORIZATION, auth.clone()))
        .set_json(&json!({ "status": "in_progress", "description": null }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK, "update failed: {}", body);
    assert_eq!(body["status"], "in_progress");
    assert_eq!(body["title"], "CRUD Test Task");
    assert_eq!(body["description"], serde_json::Value::Null);

    // 4. Delete
    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/tasks/{}", task_id))
        .insert_header((header::AUTHORIZATION, auth.clone()))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Task deleted successfully");

    // 5. Gone
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/tasks/{}", task_id))
        .insert_header((header::AUTHORIZATION, auth))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Task not found");
}

#[actix_rt::test]
async fn test_task_validation() {
    let state = app_state();
    let owner = seed_user(&state, "validate@example.com", false).await;
    let auth = bearer(&state, &owner);
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(routes::configure_app),
    )
    .await;

    let long = "x".repeat(256);
    for payload in [
        json!({ "title": "" }),
        json!({ "title": long }),
        json!({ "title": "ok", "description": long }),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/v1/tasks")
            .insert_header((header::AUTHORIZATION, auth.clone()))
            .set_json(&payload)
            .to_request();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "payload {}", payload);
    }

    let req = test::TestRequest::post()
        .uri("/api/v1/tasks")
        .insert_header((header::AUTHORIZATION, auth))
        .set_json(&json!({ "title": "ok", "status": "someday" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_task_ownership_and_scoping() {
    let state = app_state();
    let alice = seed_user(&state, "alice@example.com", false).await;
    let bob = seed_user(&state, "bob@example.com", false).await;
    let admin = seed_user(&state, "admin@example.com", true).await;
    let alice_auth = bearer(&state, &alice);
    let bob_auth = bearer(&state, &bob);
    let admin_auth = bearer(&state, &admin);
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(routes::configure_app),
    )
    .await;

    let mut alice_tasks = Vec::new();
    for title in ["first", "second", "third"] {
        let req = test::TestRequest::post()
            .uri("/api/v1/tasks")
            .insert_header((header::AUTHORIZATION, alice_auth.clone()))
            .set_json(&json!({ "title": title }))
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::CREATED);
        alice_tasks.push(body["id"].as_str().unwrap().to_string());
    }
    let req = test::TestRequest::post()
        .uri("/api/v1/tasks")
        .insert_header((header::AUTHORIZATION, bob_auth.clone()))
        .set_json(&json!({ "title": "bob's" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);

    // members only see their own tasks, oldest first
    let req = test::TestRequest::get()
        .uri("/api/v1/tasks?skip=1&limit=1")
        .insert_header((header::AUTHORIZATION, alice_auth.clone()))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "second");

    let req = test::TestRequest::get()
        .uri("/api/v1/tasks")
        .insert_header((header::AUTHORIZATION, bob_auth.clone()))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["count"], 1);

    let req = test::TestRequest::get()
        .uri("/api/v1/tasks")
        .insert_header((header::AUTHORIZATION, admin_auth.clone()))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["count"], 4);

    // a stranger's task is forbidden, a missing one not found
    let foreign = &alice_tasks[0];
    let requests = vec![
        test::TestRequest::get().uri(&format!("/api/v1/tasks/{}", foreign)),
        test::TestRequest::put()
            .uri(&format!("/api/v1/tasks/{}", foreign))
            .set_json(&json!({ "title": "hijacked" })),
        test::TestRequest::delete().uri(&format!("/api/v1/tasks/{}", foreign)),
    ];
    for req in requests {
        let req = req
            .insert_header((header::AUTHORIZATION, bob_auth.clone()))
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Not enough permissions");
    }

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/tasks/{}", Uuid::new_v4()))
        .insert_header((header::AUTHORIZATION, bob_auth))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // superusers may act on anyone's task
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/tasks/{}", foreign))
        .insert_header((header::AUTHORIZATION, admin_auth.clone()))
        .set_json(&json!({ "status": "completed" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["owner_id"], alice.id.to_string());

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/tasks/{}", foreign))
        .insert_header((header::AUTHORIZATION, admin_auth))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/v1/tasks")
        .insert_header((header::AUTHORIZATION, alice_auth))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["count"], 2);
}
