//! Lead / customer CRUD through the authenticated API.

use leadgate_core::testing::TestApp;

async fn authed_app() -> (TestApp, String, i64) {
    let app = TestApp::new().await;
    let user = app.signup_user("rm@x.com", "Secret123!", "RM").await;
    let (access, _refresh) = app.login("rm@x.com", "Secret123!").await;
    let user_id = user["id"].as_i64().unwrap();
    (app, access, user_id)
}

#[tokio::test]
async fn crm_routes_require_authentication() {
    let app = TestApp::new().await;

    let res = app.get("/api/leads").await;
    assert_eq!(res.status, 401);

    let res = app.get("/api/customers").await;
    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn lead_crud_round_trip() {
    let (app, access, user_id) = authed_app().await;

    let res = app
        .post_with_auth(
            "/api/leads",
            &access,
            serde_json::json!({
                "first_name": "Priya",
                "last_name": "Sharma",
                "email": "priya@corp.example",
                "phone": "+91-98000-00001",
                "company_name": "Sharma Traders",
                "source": "referral",
                "deal_value": 125000.0
            }),
        )
        .await;
    assert_eq!(res.status, 200, "create failed: {}", res.body);

    let lead = res.data();
    let id = lead["id"].as_i64().unwrap();
    assert_eq!(lead["status"], "new");
    assert_eq!(lead["created_by"].as_i64().unwrap(), user_id);

    let res = app.get_with_auth("/api/leads", &access).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data().as_array().unwrap().len(), 1);

    let res = app
        .get_with_auth(&format!("/api/leads/{}", id), &access)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["first_name"], "Priya");

    let res = app
        .patch_with_auth(
            &format!("/api/leads/{}", id),
            &access,
            serde_json::json!({ "status": "qualified", "assigned_rm": "RM" }),
        )
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["status"], "qualified");
    assert_eq!(res.data()["assigned_rm"], "RM");
    // Untouched fields survive a partial update.
    assert_eq!(res.data()["email"], "priya@corp.example");

    let res = app
        .delete_with_auth(&format!("/api/leads/{}", id), &access)
        .await;
    assert_eq!(res.status, 200);

    let res = app
        .get_with_auth(&format!("/api/leads/{}", id), &access)
        .await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn lead_list_paginates() {
    let (app, access, _user_id) = authed_app().await;

    for i in 0..3 {
        let res = app
            .post_with_auth(
                "/api/leads",
                &access,
                serde_json::json!({
                    "first_name": format!("Lead{}", i),
                    "last_name": "Test",
                    "email": format!("lead{}@x.com", i),
                    "phone": "000"
                }),
            )
            .await;
        assert_eq!(res.status, 200);
    }

    let res = app.get_with_auth("/api/leads?limit=2", &access).await;
    assert_eq!(res.data().as_array().unwrap().len(), 2);

    let res = app
        .get_with_auth("/api/leads?limit=2&offset=2", &access)
        .await;
    assert_eq!(res.data().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_ids_return_not_found() {
    let (app, access, _user_id) = authed_app().await;

    for res in [
        app.get_with_auth("/api/leads/999", &access).await,
        app.patch_with_auth("/api/leads/999", &access, serde_json::json!({ "status": "won" }))
            .await,
        app.delete_with_auth("/api/leads/999", &access).await,
        app.get_with_auth("/api/customers/999", &access).await,
    ] {
        assert_eq!(res.status, 404);
        assert_eq!(res.error_code().as_deref(), Some("NOT_FOUND"));
    }
}

#[tokio::test]
async fn customer_crud_round_trip() {
    let (app, access, _user_id) = authed_app().await;

    let res = app
        .post_with_auth(
            "/api/customers",
            &access,
            serde_json::json!({
                "name": "Sharma Traders LLP",
                "email": "accounts@sharma.example",
                "phone": "+91-98000-00002",
                "applicant_type": "Business",
                "entity_type": "LLP",
                "gstin": "27ABCDE1234F1Z5"
            }),
        )
        .await;
    assert_eq!(res.status, 200, "create failed: {}", res.body);
    let id = res.data()["id"].as_i64().unwrap();

    let res = app
        .patch_with_auth(
            &format!("/api/customers/{}", id),
            &access,
            serde_json::json!({ "city": "Pune", "contact_person": "Priya Sharma" }),
        )
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["city"], "Pune");
    assert_eq!(res.data()["applicant_type"], "Business");

    let res = app
        .delete_with_auth(&format!("/api/customers/{}", id), &access)
        .await;
    assert_eq!(res.status, 200);

    let res = app.get_with_auth("/api/customers", &access).await;
    assert_eq!(res.data().as_array().unwrap().len(), 0);
}
