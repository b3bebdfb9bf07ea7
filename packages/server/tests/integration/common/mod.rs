use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::post;
use ::common::storage::filesystem::FilesystemAttachmentStore;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, Set};
use serde_json::{Value, json};
use tempfile::TempDir;

use inventario_server::config::{
    AppConfig, AuthConfig, CorsConfig, DatabaseConfig, ServerConfig, StorageConfig,
};
use inventario_server::directory::empleado;
use inventario_server::state::AppState;

pub mod routes {
    pub const ACTIVOS: &str = "/api/activos";
    pub const LOGIN: &str = "/api/auth/login";
    pub const AUTHENTICATE: &str = "/api/auth/authenticate";

    pub fn activo(id: i32) -> String {
        format!("/api/activos/{id}")
    }

    pub fn activo_files(id: i32) -> String {
        format!("/api/activos/{id}/files")
    }

    pub fn activo_upload(id: i32) -> String {
        format!("/api/activos/{id}/upload")
    }

    pub fn activo_baja(id: i32) -> String {
        format!("/api/activos/{id}/baja")
    }

    pub fn configuration(kind: &str) -> String {
        format!("/api/configuration/{kind}")
    }

    pub fn configuration_entry(kind: &str, id: i32) -> String {
        format!("/api/configuration/{kind}/{id}")
    }
}

/// Largest single file the test server accepts.
pub const MAX_FILE_SIZE: u64 = 64 * 1024;

/// A file part of a multipart request: (field, file name, bytes).
pub type FilePart<'a> = (&'a str, &'a str, Vec<u8>);

/// Catalog ids every asset needs.
#[derive(Clone, Copy, Debug)]
pub struct Catalogs {
    pub tipo: i32,
    pub ubicacion: i32,
    pub planta: i32,
}

/// A running test server with its own SQLite database and public directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub public_dir: PathBuf,
    _dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let public_dir = dir.path().join("public");
        let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());

        let db = inventario_server::database::init_db(&db_url)
            .await
            .expect("Failed to initialize test database");
        // The directory owns this table; the inventory sync leaves it alone.
        db.execute_unprepared(
            "CREATE TABLE del_empleados (emp_id INTEGER PRIMARY KEY NOT NULL, emp_alias TEXT NOT NULL)",
        )
        .await
        .expect("Failed to create employee table");

        let directory_addr = spawn_directory_stub().await;

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig {
                url: db_url,
                empleados_url: None,
            },
            storage: StorageConfig {
                public_dir: public_dir.clone(),
                max_file_size: MAX_FILE_SIZE,
                max_request_size: 1024 * 1024,
            },
            auth: AuthConfig {
                directory_url: format!("http://{directory_addr}/authenticate"),
                timeout_secs: 1,
            },
        };

        let attachments = FilesystemAttachmentStore::new(public_dir.clone(), MAX_FILE_SIZE)
            .await
            .expect("Failed to create attachment store");

        let state = AppState {
            db: db.clone(),
            empleados_db: db.clone(),
            config: Arc::new(app_config),
            attachments: Arc::new(attachments),
            http: Client::new(),
        };

        let app = inventario_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            public_dir,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Absolute path of a stored attachment, given its public URL.
    pub fn file_path(&self, url: &str) -> PathBuf {
        self.public_dir.join(url.trim_start_matches('/'))
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send PUT request");

        TestResponse::from_response(res).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    pub async fn delete_json(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    pub async fn post_multipart(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        files: Vec<FilePart<'_>>,
    ) -> TestResponse {
        let mut form = Form::new();
        for (name, value) in fields {
            form = form.text(name.to_string(), value.to_string());
        }
        for (field, file_name, data) in files {
            form = form.part(
                field.to_string(),
                Part::bytes(data).file_name(file_name.to_string()),
            );
        }

        let res = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart request");

        TestResponse::from_response(res).await
    }

    /// Create one active entry in each catalog.
    pub async fn create_catalogs(&self) -> Catalogs {
        let mut ids = Vec::new();
        for (kind, nombre) in [
            ("tipos", "Computo"),
            ("ubicaciones", "Almacén"),
            ("plantas", "Planta Norte"),
        ] {
            let res = self
                .post_json(&routes::configuration(kind), &json!({ "nombre": nombre }))
                .await;
            assert_eq!(res.status, 201, "Creating {kind} failed: {}", res.text);
            ids.push(res.data_id());
        }
        Catalogs {
            tipo: ids[0],
            ubicacion: ids[1],
            planta: ids[2],
        }
    }

    /// Create an asset through the multipart endpoint.
    pub async fn create_activo(
        &self,
        catalogs: Catalogs,
        numero_etiqueta: &str,
        files: Vec<FilePart<'_>>,
    ) -> TestResponse {
        let tipo = catalogs.tipo.to_string();
        let ubicacion = catalogs.ubicacion.to_string();
        let planta = catalogs.planta.to_string();
        let fields = [
            ("numeroActivo", "ACT-0001"),
            ("numeroEtiqueta", numero_etiqueta),
            ("tipo", tipo.as_str()),
            ("marca", "Dell"),
            ("modelo", "Latitude 5440"),
            ("serie", "SN-123"),
            ("ubicacion", ubicacion.as_str()),
            ("planta", planta.as_str()),
            ("nacionalExtranjero", "Nacional"),
            ("fechaAlta", "2024-05-01"),
            ("userAlta", "tester"),
        ];
        self.post_multipart(routes::ACTIVOS, &fields, files).await
    }

    /// Create an asset without files and return its id.
    pub async fn create_activo_id(&self, catalogs: Catalogs, numero_etiqueta: &str) -> i32 {
        let res = self.create_activo(catalogs, numero_etiqueta, vec![]).await;
        assert_eq!(res.status, 201, "Creating asset failed: {}", res.text);
        res.data_id()
    }

    /// Full PUT body reproducing the asset as created by [`TestApp::create_activo`].
    pub fn update_body(&self, catalogs: Catalogs, numero_etiqueta: &str) -> Value {
        json!({
            "numeroActivo": "ACT-0001",
            "numeroEtiqueta": numero_etiqueta,
            "tipo_id": catalogs.tipo,
            "marca": "Dell",
            "modelo": "Latitude 5440",
            "serie": "SN-123",
            "ubicacion_id": catalogs.ubicacion,
            "planta_id": catalogs.planta,
            "nacionalExtranjero": "Nacional",
        })
    }

    pub async fn insert_empleado(&self, emp_id: i32, emp_alias: &str) {
        empleado::ActiveModel {
            emp_id: Set(emp_id),
            emp_alias: Set(emp_alias.to_string()),
        }
        .insert(&self.db)
        .await
        .expect("Failed to insert employee");
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    pub fn data_id(&self) -> i32 {
        self.body["data"]["id"]
            .as_i64()
            .expect("response body should contain 'data.id'") as i32
    }

    /// String values of a JSON array under `data`.
    pub fn data_list(&self, key: &str) -> Vec<String> {
        self.body["data"][key]
            .as_array()
            .unwrap_or_else(|| panic!("data.{key} should be an array: {}", self.text))
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    pub fn code(&self) -> &str {
        self.body["code"].as_str().unwrap_or_default()
    }
}

/// List the names in an upload folder, sorted.
pub fn folder_entries(public_dir: &Path, folder: &str) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(public_dir.join("uploads").join(folder)) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

/// Start a fake directory service.
///
/// * `jdoe` / `secret`: accepted, has an employee record in most tests
/// * `ghost` / `secret`: accepted, never has an employee record
/// * `slow`: answers after the client timeout
/// * `html`: answers with a non-JSON body
/// * anything else: rejected with 401
async fn spawn_directory_stub() -> SocketAddr {
    async fn authenticate(Json(body): Json<Value>) -> axum::response::Response {
        let username = body["username"].as_str().unwrap_or_default().to_string();
        let password = body["password"].as_str().unwrap_or_default();

        match (username.as_str(), password) {
            ("jdoe" | "ghost", "secret") => Json(json!({
                "authenticated": true,
                "username": username,
                "isAdmin": username == "jdoe",
                "message": "Authentication successful",
                "userInfo": { "displayName": "John Doe" },
                "groups": ["IT"],
            }))
            .into_response(),
            ("slow", _) => {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({ "authenticated": true })).into_response()
            }
            ("html", _) => (
                StatusCode::BAD_GATEWAY,
                [(header::CONTENT_TYPE, "text/html")],
                "<html>proxy error</html>",
            )
                .into_response(),
            _ => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "authenticated": false, "message": "Invalid credentials" })),
            )
                .into_response(),
        }
    }

    let app = axum::Router::new().route("/authenticate", post(authenticate));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind directory stub");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
