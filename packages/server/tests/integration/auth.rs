use inventario_server::directory::empleado;
use sea_orm::EntityTrait;
use serde_json::json;

use crate::common::{TestApp, routes};

mod login {
    use super::*;

    #[tokio::test]
    async fn matches_alias_and_employee_id() {
        let app = TestApp::spawn().await;
        app.insert_empleado(1042, "jdoe").await;

        let res = app
            .post_json(
                routes::LOGIN,
                &json!({ "usuario": "jdoe", "contraseña": "1042" }),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["success"], true);
        assert_eq!(res.body["data"]["emp_id"], 1042);
        assert_eq!(res.body["data"]["emp_alias"], "jdoe");
    }

    #[tokio::test]
    async fn wrong_id_is_unauthorized() {
        let app = TestApp::spawn().await;
        app.insert_empleado(1042, "jdoe").await;

        let res = app
            .post_json(
                routes::LOGIN,
                &json!({ "usuario": "jdoe", "contraseña": "1043" }),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.code(), "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        let app = TestApp::spawn().await;

        let res = app.post_json(routes::LOGIN, &json!({ "usuario": "jdoe" })).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "Usuario y contraseña son requeridos");
    }

    #[tokio::test]
    async fn non_numeric_password_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(
                routes::LOGIN,
                &json!({ "usuario": "jdoe", "contraseña": "abc" }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "Contraseña inválida");
    }
}

mod authenticate {
    use super::*;

    #[tokio::test]
    async fn resolves_employee_record() {
        let app = TestApp::spawn().await;
        app.insert_empleado(77, "jdoe").await;

        let res = app
            .post_json(
                routes::AUTHENTICATE,
                &json!({ "username": "jdoe", "password": "secret" }),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["authenticated"], true);
        assert_eq!(res.body["data"]["emp_id"], 77);
        assert_eq!(res.body["data"]["emp_alias"], "jdoe");
        assert_eq!(res.body["isAdmin"], true);
        assert_eq!(res.body["groups"], json!(["IT"]));
    }

    #[tokio::test]
    async fn falls_back_to_username_without_record() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(
                routes::AUTHENTICATE,
                &json!({ "username": "ghost", "password": "secret" }),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"]["emp_id"], "ghost");
        assert_eq!(res.body["data"]["emp_alias"], "ghost");
        assert_eq!(res.body["isAdmin"], false);
        assert_eq!(
            res.body["message"],
            "User authenticated (employee record not found for ghost)"
        );
    }

    #[tokio::test]
    async fn rejected_credentials_keep_directory_status() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(
                routes::AUTHENTICATE,
                &json!({ "username": "jdoe", "password": "wrong" }),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.code(), "AUTH_REJECTED");
        assert_eq!(res.body["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn missing_credentials_are_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(routes::AUTHENTICATE, &json!({ "username": "jdoe" }))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "Username and password are required");
    }

    #[tokio::test]
    async fn slow_directory_times_out() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(
                routes::AUTHENTICATE,
                &json!({ "username": "slow", "password": "x" }),
            )
            .await;

        assert_eq!(res.status, 504);
        assert_eq!(res.code(), "UPSTREAM_TIMEOUT");
    }

    #[tokio::test]
    async fn non_json_reply_is_upstream_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(
                routes::AUTHENTICATE,
                &json!({ "username": "html", "password": "x" }),
            )
            .await;

        assert_eq!(res.status, 502);
        assert_eq!(res.code(), "UPSTREAM_ERROR");
    }
}

mod schema {
    use super::*;

    #[tokio::test]
    async fn inventory_sync_leaves_employee_table_alone() {
        let dir = tempfile::tempdir().unwrap();
        let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("fresh.db").display());

        let db = inventario_server::database::init_db(&db_url).await.unwrap();

        assert!(empleado::Entity::find().one(&db).await.is_err());
    }
}
