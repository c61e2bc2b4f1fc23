//! Hotels, departments, areas, staff and the global catalogs.

mod common;

use axum::http::{Method, StatusCode};
use common::{delete_request, get_request, id_of, json_request, parse_response_body, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_tenant_crud_as_root() {
    let app = TestApp::new().await;
    let root = app.root_token().await;

    let created = app
        .create("/api/v1/tenants", &root, None, &json!({ "name": "Hotel Cancún", "code": "CUN" }))
        .await;
    let id = id_of(&created);
    assert_eq!(created["code"], "CUN");
    assert_eq!(created["active"], true);

    let response = app
        .send(json_request(
            Method::PUT,
            &format!("/api/v1/tenants/{id}"),
            Some(&root),
            None,
            &json!({ "name": "Hotel Cancún Centro", "active": false }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = parse_response_body(response).await;
    assert_eq!(updated["name"], "Hotel Cancún Centro");
    assert_eq!(updated["active"], false);

    let response = app
        .send(delete_request(&format!("/api/v1/tenants/{id}"), Some(&root), None))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .send(get_request(&format!("/api/v1/tenants/{id}"), Some(&root), None))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_tenant_code_conflicts() {
    let app = TestApp::new().await;
    let root = app.root_token().await;
    app.create_tenant(&root, "Hotel Cancún", "CUN").await;

    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/tenants",
            Some(&root),
            None,
            &json!({ "name": "Otro", "code": "cun" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_tenant_admin_cannot_create_hotels() {
    let app = TestApp::new().await;
    let root = app.root_token().await;
    let hotel = app.create_tenant(&root, "Hotel Cancún", "CUN").await;
    let admin = app
        .create_principal(&root, "cun-admin", "tenant_admin", &[&hotel])
        .await;

    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/tenants",
            Some(&admin),
            None,
            &json!({ "name": "Hotel Nuevo", "code": "NEW" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Its own hotel is still visible.
    let response = app
        .send(get_request("/api/v1/tenants", Some(&admin), None))
        .await;
    let body = parse_response_body(response).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["id"], hotel.as_str());
}

#[tokio::test]
async fn test_department_and_area_flow() {
    let app = TestApp::new().await;
    let root = app.root_token().await;
    let hotel = app.create_tenant(&root, "Hotel Cancún", "CUN").await;
    let admin = app
        .create_principal(&root, "cun-admin", "tenant_admin", &[&hotel])
        .await;

    // A single assigned hotel is the implicit target.
    let department = app
        .create("/api/v1/departments", &admin, None, &json!({ "name": "Recepción" }))
        .await;
    assert_eq!(department["tenantId"], hotel.as_str());
    let department_id = id_of(&department);

    let area = app
        .create(
            "/api/v1/areas",
            &admin,
            None,
            &json!({ "departmentId": department_id, "name": "Lobby" }),
        )
        .await;
    let area_id = id_of(&area);
    assert_eq!(area["tenantId"], hotel.as_str());

    let response = app
        .send(get_request(
            &format!("/api/v1/areas?departmentId={department_id}"),
            Some(&admin),
            None,
        ))
        .await;
    let body = parse_response_body(response).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["name"], "Lobby");

    let response = app
        .send(delete_request(
            &format!("/api/v1/departments/{department_id}"),
            Some(&admin),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .send(delete_request(&format!("/api/v1/areas/{area_id}"), Some(&admin), None))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .send(delete_request(
            &format!("/api/v1/departments/{department_id}"),
            Some(&admin),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_root_must_name_the_hotel() {
    let app = TestApp::new().await;
    let root = app.root_token().await;
    let hotel = app.create_tenant(&root, "Hotel Cancún", "CUN").await;

    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/departments",
            Some(&root),
            None,
            &json!({ "name": "Sistemas" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let created = app
        .create("/api/v1/departments", &root, Some(&hotel), &json!({ "name": "Sistemas" }))
        .await;
    assert_eq!(created["tenantId"], hotel.as_str());
}

#[tokio::test]
async fn test_other_hotels_records_are_not_found() {
    let app = TestApp::new().await;
    let root = app.root_token().await;
    let cancun = app.create_tenant(&root, "Hotel Cancún", "CUN").await;
    let merida = app.create_tenant(&root, "Hotel Mérida", "MID").await;
    let cancun_admin = app
        .create_principal(&root, "cun-admin", "tenant_admin", &[&cancun])
        .await;

    let department = app
        .create("/api/v1/departments", &root, Some(&merida), &json!({ "name": "Cocina" }))
        .await;
    let department_id = id_of(&department);

    let response = app
        .send(get_request(
            &format!("/api/v1/departments/{department_id}"),
            Some(&cancun_admin),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .send(delete_request(
            &format!("/api/v1/departments/{department_id}"),
            Some(&cancun_admin),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .send(get_request("/api/v1/departments", Some(&cancun_admin), None))
        .await;
    let body = parse_response_body(response).await;
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_read_only_roles_cannot_write() {
    let app = TestApp::new().await;
    let root = app.root_token().await;
    let hotel = app.create_tenant(&root, "Hotel Cancún", "CUN").await;
    let guest = app
        .create_principal(&root, "cun-guest", "tenant_guest", &[&hotel])
        .await;
    let viewer = app.create_principal(&root, "auditor", "global_viewer", &[]).await;

    app.create("/api/v1/departments", &root, Some(&hotel), &json!({ "name": "Ama de llaves" }))
        .await;

    for (token, tenant) in [(&guest, None), (&viewer, Some(hotel.as_str()))] {
        let response = app
            .send(json_request(
                Method::POST,
                "/api/v1/departments",
                Some(token),
                tenant,
                &json!({ "name": "Mantenimiento" }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .send(get_request("/api/v1/departments", Some(token), tenant))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_response_body(response).await;
        assert_eq!(body["pagination"]["total"], 1);
    }
}

#[tokio::test]
async fn test_staff_users() {
    let app = TestApp::new().await;
    let root = app.root_token().await;
    let hotel = app.create_tenant(&root, "Hotel Cancún", "CUN").await;
    let assistant = app
        .create_principal(&root, "cun-assistant", "tenant_assistant", &[&hotel])
        .await;

    let staff = app
        .create(
            "/api/v1/staff-users",
            &assistant,
            None,
            &json!({ "fullName": "María Pérez", "login": "mperez", "position": "Recepcionista" }),
        )
        .await;
    let staff_id = id_of(&staff);
    assert_eq!(staff["fullName"], "María Pérez");

    let response = app
        .send(json_request(
            Method::PUT,
            &format!("/api/v1/staff-users/{staff_id}"),
            Some(&assistant),
            None,
            &json!({ "position": "Gerente de recepción" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = parse_response_body(response).await;
    assert_eq!(updated["position"], "Gerente de recepción");

    let response = app
        .send(delete_request(
            &format!("/api/v1/staff-users/{staff_id}"),
            Some(&assistant),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/staff-users",
            Some(&assistant),
            None,
            &json!({ "fullName": "Sin correo", "email": "not-an-email" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_catalog_names_are_unique_ignoring_case_and_accents() {
    let app = TestApp::new().await;
    let root = app.root_token().await;

    let entry = app
        .create("/api/v1/catalogs/device-types", &root, None, &json!({ "name": "Portátil" }))
        .await;
    assert_eq!(entry["name"], "Portátil");

    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/catalogs/device-types",
            Some(&root),
            None,
            &json!({ "name": "  PORTATIL " }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The same name is fine in another catalog.
    app.create("/api/v1/catalogs/device-statuses", &root, None, &json!({ "name": "Portátil" }))
        .await;

    let response = app
        .send(get_request("/api/v1/catalogs/device-types", Some(&root), None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_catalog_permissions() {
    let app = TestApp::new().await;
    let root = app.root_token().await;
    let hotel = app.create_tenant(&root, "Hotel Cancún", "CUN").await;
    let admin = app
        .create_principal(&root, "cun-admin", "tenant_admin", &[&hotel])
        .await;
    let assistant = app
        .create_principal(&root, "cun-assistant", "tenant_assistant", &[&hotel])
        .await;

    let entry = app
        .create("/api/v1/catalogs/operating-systems", &admin, None, &json!({ "name": "Windows 11" }))
        .await;
    let entry_id = id_of(&entry);

    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/catalogs/operating-systems",
            Some(&assistant),
            None,
            &json!({ "name": "Ubuntu" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .send(delete_request(
            &format!("/api/v1/catalogs/operating-systems/{entry_id}"),
            Some(&admin),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .send(json_request(
            Method::PUT,
            &format!("/api/v1/catalogs/operating-systems/{entry_id}"),
            Some(&root),
            None,
            &json!({ "name": "Windows 11 Pro" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .send(delete_request(
            &format!("/api/v1/catalogs/operating-systems/{entry_id}"),
            Some(&root),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_unknown_catalog_kind() {
    let app = TestApp::new().await;
    let root = app.root_token().await;

    let response = app
        .send(get_request("/api/v1/catalogs/printers", Some(&root), None))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
