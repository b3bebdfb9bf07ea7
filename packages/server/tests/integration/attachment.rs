use serde_json::json;

use crate::common::{TestApp, folder_entries, routes};

mod upload {
    use super::*;

    #[tokio::test]
    async fn pictures_continue_after_highest_index() {
        let app = TestApp::spawn().await;
        let catalogs = app.create_catalogs().await;
        let id = app
            .create_activo(
                catalogs,
                "A-100",
                vec![
                    ("assetPictures", "1.jpg", b"1".to_vec()),
                    ("assetPictures", "2.jpg", b"2".to_vec()),
                ],
            )
            .await
            .data_id();

        let res = app
            .post_multipart(
                &routes::activo_upload(id),
                &[],
                vec![("assetPictures", "3.jpg", b"3".to_vec())],
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(
            res.data_list("pictures"),
            vec!["/uploads/pictures/A-100_3.jpg"]
        );
        assert_eq!(
            folder_entries(&app.public_dir, "pictures"),
            vec!["A-100_1.jpg", "A-100_2.jpg", "A-100_3.jpg"]
        );
    }

    #[tokio::test]
    async fn extras_keep_original_stem() {
        let app = TestApp::spawn().await;
        let catalogs = app.create_catalogs().await;
        let id = app.create_activo_id(catalogs, "E-1").await;

        let res = app
            .post_multipart(
                &routes::activo_upload(id),
                &[],
                vec![
                    ("extraFiles", "manual de uso.pdf", b"m".to_vec()),
                    ("extraFiles", "garantia.PDF", b"g".to_vec()),
                ],
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(
            res.data_list("extraFiles"),
            vec![
                "/uploads/extras/E-1_extra_1_manual_de_uso.pdf",
                "/uploads/extras/E-1_extra_2_garantia.pdf",
            ]
        );
    }

    #[tokio::test]
    async fn single_document_is_replaced() {
        let app = TestApp::spawn().await;
        let catalogs = app.create_catalogs().await;
        let id = app
            .create_activo(
                catalogs,
                "D-1",
                vec![("factura", "old.png", b"old".to_vec())],
            )
            .await
            .data_id();

        let res = app
            .post_multipart(
                &routes::activo_upload(id),
                &[],
                vec![("factura", "new.pdf", b"new".to_vec())],
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(
            folder_entries(&app.public_dir, "facturas"),
            vec!["D-1_factura.pdf"]
        );
        let files = app.get(&routes::activo_files(id)).await;
        assert_eq!(files.body["data"]["factura"], "/uploads/facturas/D-1_factura.pdf");
    }

    #[tokio::test]
    async fn empty_upload_is_rejected() {
        let app = TestApp::spawn().await;
        let catalogs = app.create_catalogs().await;
        let id = app.create_activo_id(catalogs, "N-1").await;

        let res = app
            .post_multipart(&routes::activo_upload(id), &[("marca", "x")], vec![])
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "No se recibieron archivos");
    }

    #[tokio::test]
    async fn upload_to_unknown_asset_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .post_multipart(
                &routes::activo_upload(3),
                &[],
                vec![("assetPictures", "a.jpg", b"a".to_vec())],
            )
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn upload_to_retired_asset_conflicts() {
        let app = TestApp::spawn().await;
        let catalogs = app.create_catalogs().await;
        let id = app.create_activo_id(catalogs, "X-1").await;
        assert_eq!(app.delete(&routes::activo(id)).await.status, 200);

        let res = app
            .post_multipart(
                &routes::activo_upload(id),
                &[],
                vec![("assetPictures", "a.jpg", b"a".to_vec())],
            )
            .await;

        assert_eq!(res.status, 409);
        assert!(folder_entries(&app.public_dir, "pictures").is_empty());
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn asset_without_files_has_empty_set() {
        let app = TestApp::spawn().await;
        let catalogs = app.create_catalogs().await;
        let id = app.create_activo_id(catalogs, "F-1").await;

        let res = app.get(&routes::activo_files(id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(
            res.body["data"],
            json!({
                "pictures": [],
                "pedimento": null,
                "factura": null,
                "archivoAlta": null,
                "archivoBaja": null,
                "extraFiles": [],
            })
        );
    }

    #[tokio::test]
    async fn files_of_similar_prefixes_stay_separate() {
        let app = TestApp::spawn().await;
        let catalogs = app.create_catalogs().await;
        let short = app
            .create_activo(catalogs, "A", vec![("assetPictures", "a.jpg", b"a".to_vec())])
            .await
            .data_id();
        app.create_activo(catalogs, "A_1", vec![("assetPictures", "b.jpg", b"b".to_vec())])
            .await;

        let res = app.get(&routes::activo_files(short)).await;

        assert_eq!(res.data_list("pictures"), vec!["/uploads/pictures/A_1.jpg"]);
    }

    #[tokio::test]
    async fn unknown_asset_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::activo_files(11)).await;

        assert_eq!(res.status, 404);
    }
}

mod deletion {
    use super::*;

    #[tokio::test]
    async fn deletes_listed_files_and_flagged_documents() {
        let app = TestApp::spawn().await;
        let catalogs = app.create_catalogs().await;
        let id = app
            .create_activo(
                catalogs,
                "DEL-1",
                vec![
                    ("assetPictures", "a.jpg", b"a".to_vec()),
                    ("assetPictures", "b.jpg", b"b".to_vec()),
                    ("pedimento", "p.pdf", b"p".to_vec()),
                ],
            )
            .await
            .data_id();

        let res = app
            .delete_json(
                &routes::activo_files(id),
                &json!({
                    "pictures": ["/uploads/pictures/DEL-1_1.jpg"],
                    "pedimento": true,
                }),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let mut deleted = res.data_list("deletedFiles");
        deleted.sort();
        assert_eq!(
            deleted,
            vec![
                "/uploads/pedimentos/DEL-1_pedimento.pdf",
                "/uploads/pictures/DEL-1_1.jpg",
            ]
        );
        assert_eq!(res.body["data"]["failedFiles"], json!([]));

        let files = app.get(&routes::activo_files(id)).await;
        assert_eq!(
            files.data_list("pictures"),
            vec!["/uploads/pictures/DEL-1_2.jpg"]
        );
        assert!(files.body["data"]["pedimento"].is_null());
    }

    #[tokio::test]
    async fn foreign_and_missing_files_are_reported() {
        let app = TestApp::spawn().await;
        let catalogs = app.create_catalogs().await;
        let id = app
            .create_activo(catalogs, "OWN-1", vec![("assetPictures", "a.jpg", b"a".to_vec())])
            .await
            .data_id();
        app.create_activo(catalogs, "OTHER-1", vec![("assetPictures", "b.jpg", b"b".to_vec())])
            .await;

        let res = app
            .delete_json(
                &routes::activo_files(id),
                &json!({
                    "pictures": [
                        "/uploads/pictures/OTHER-1_1.jpg",
                        "/uploads/pictures/OWN-1_9.jpg",
                        "/uploads/pictures/../extras/OWN-1_1.jpg",
                        "/uploads/pictures/OWN-1_1.jpg",
                    ],
                }),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(
            res.data_list("deletedFiles"),
            vec!["/uploads/pictures/OWN-1_1.jpg"]
        );
        let failed = res.body["data"]["failedFiles"].as_array().unwrap();
        assert_eq!(failed.len(), 3);
        assert_eq!(failed[0]["url"], "/uploads/pictures/OTHER-1_1.jpg");
        assert_eq!(res.body["message"], "Algunos archivos no pudieron eliminarse");

        // The other asset's picture is untouched.
        assert_eq!(
            folder_entries(&app.public_dir, "pictures"),
            vec!["OTHER-1_1.jpg"]
        );
    }

    #[tokio::test]
    async fn flag_without_document_is_a_no_op() {
        let app = TestApp::spawn().await;
        let catalogs = app.create_catalogs().await;
        let id = app.create_activo_id(catalogs, "NF-1").await;

        let res = app
            .delete_json(&routes::activo_files(id), &json!({ "factura": true }))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"]["deletedFiles"], json!([]));
        assert_eq!(res.body["data"]["failedFiles"], json!([]));
    }

    #[tokio::test]
    async fn empty_request_deletes_nothing() {
        let app = TestApp::spawn().await;
        let catalogs = app.create_catalogs().await;
        let id = app
            .create_activo(catalogs, "EMP-1", vec![("assetPictures", "a.jpg", b"a".to_vec())])
            .await
            .data_id();

        let res = app.delete_json(&routes::activo_files(id), &json!({})).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"]["deletedFiles"], json!([]));
        assert_eq!(folder_entries(&app.public_dir, "pictures").len(), 1);
    }

    #[tokio::test]
    async fn retired_asset_files_cannot_be_deleted() {
        let app = TestApp::spawn().await;
        let catalogs = app.create_catalogs().await;
        let id = app
            .create_activo(catalogs, "RD-1", vec![("assetPictures", "a.jpg", b"a".to_vec())])
            .await
            .data_id();
        assert_eq!(app.delete(&routes::activo(id)).await.status, 200);

        let res = app
            .delete_json(
                &routes::activo_files(id),
                &json!({ "pictures": ["/uploads/pictures/RD-1_1.jpg"] }),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.code(), "ASSET_RETIRED");
        assert_eq!(folder_entries(&app.public_dir, "pictures"), vec!["RD-1_1.jpg"]);
    }
}
