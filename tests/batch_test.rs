//! End-to-end batch tests against a mocked Drive API.

use std::fs;

use drive_fetch::batch::{write_metadata_index, METADATA_INDEX_FILE};
use drive_fetch::client::METADATA_FIELDS;
use drive_fetch::{download_all, Authenticator, DownloadStatus, DriveClient, ExportPreset};
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::json;
use tempfile::TempDir;

fn client_for(server: &ServerGuard) -> DriveClient {
    DriveClient::new(Authenticator::from_access_token("test-token")).with_base_url(server.url())
}

async fn mock_metadata(server: &mut ServerGuard, id: &str, name: &str, mime: &str, modified: &str) -> Mock {
    server
        .mock("GET", format!("/files/{}", id).as_str())
        .match_query(Matcher::UrlEncoded("fields".into(), METADATA_FIELDS.into()))
        .with_status(200)
        .with_body(
            json!({"id": id, "name": name, "mimeType": mime, "modifiedTime": modified}).to_string(),
        )
        .expect(1)
        .create_async()
        .await
}

async fn mock_not_found(server: &mut ServerGuard, id: &str) -> Mock {
    server
        .mock("GET", format!("/files/{}", id).as_str())
        .match_query(Matcher::UrlEncoded("fields".into(), METADATA_FIELDS.into()))
        .with_status(404)
        .with_body(json!({"error": {"code": 404, "message": format!("File not found: {}.", id)}}).to_string())
        .expect(1)
        .create_async()
        .await
}

mod mixed_batch {
    use super::*;

    #[tokio::test]
    async fn one_failure_does_not_stop_the_batch() {
        let mut server = Server::new_async().await;
        let doc = mock_metadata(
            &mut server,
            "DOC1",
            "Roadmap",
            "application/vnd.google-apps.document",
            "2024-01-10T00:00:00.000Z",
        )
        .await;
        let export = server
            .mock("GET", "/files/DOC1/export")
            .match_query(Matcher::UrlEncoded("mimeType".into(), "text/markdown".into()))
            .with_status(200)
            .with_body("# Roadmap\n")
            .expect(1)
            .create_async()
            .await;
        let missing = mock_not_found(&mut server, "MISSING").await;
        let pdf = mock_metadata(
            &mut server,
            "PDF1",
            "scan.pdf",
            "application/pdf",
            "2024-02-01T00:00:00.000Z",
        )
        .await;
        let media = server
            .mock("GET", "/files/PDF1")
            .match_query(Matcher::UrlEncoded("alt".into(), "media".into()))
            .with_status(200)
            .with_body(b"%PDF-1.4")
            .expect(1)
            .create_async()
            .await;

        let out = TempDir::new().unwrap();
        let refs = [
            "https://docs.google.com/document/d/DOC1/edit",
            "MISSING",
            "https://drive.google.com/file/d/PDF1/view?usp=sharing",
        ];
        let summary = download_all(&client_for(&server), &refs, out.path(), ExportPreset::TextOnly)
            .await
            .unwrap();

        for mock in [doc, export, missing, pdf, media] {
            mock.assert_async().await;
        }

        assert_eq!(summary.total(), 3);
        assert_eq!(summary.success_count(), 2);
        assert_eq!(summary.failure_count(), 1);

        assert!(summary.results[0].is_success());
        assert_eq!(summary.results[1].name, "MISSING");
        match &summary.results[1].status {
            DownloadStatus::Failure { reason } => assert!(reason.contains("404")),
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(summary.results[2].is_success());

        assert_eq!(
            fs::read_to_string(out.path().join("Roadmap.md")).unwrap(),
            "# Roadmap\n"
        );
        assert_eq!(fs::read(out.path().join("scan.pdf")).unwrap(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn export_rejection_is_a_per_file_failure() {
        let mut server = Server::new_async().await;
        mock_metadata(
            &mut server,
            "SHEET1",
            "Budget",
            "application/vnd.google-apps.spreadsheet",
            "2024-01-01T00:00:00.000Z",
        )
        .await;
        server
            .mock("GET", "/files/SHEET1/export")
            .match_query(Matcher::UrlEncoded("mimeType".into(), "text/csv".into()))
            .with_status(403)
            .with_body(json!({"error": {"code": 403, "message": "Export not allowed"}}).to_string())
            .create_async()
            .await;

        let out = TempDir::new().unwrap();
        let summary = download_all(&client_for(&server), &["SHEET1"], out.path(), ExportPreset::TextOnly)
            .await
            .unwrap();

        assert_eq!(summary.total(), 1);
        assert_eq!(summary.results[0].name, "Budget");
        assert!(!summary.results[0].is_success());
        assert!(!out.path().join("Budget.csv").exists());
    }
}

mod special_cases {
    use super::*;

    #[tokio::test]
    async fn folders_are_rejected() {
        let mut server = Server::new_async().await;
        mock_metadata(
            &mut server,
            "FOLDER1",
            "Projects",
            "application/vnd.google-apps.folder",
            "2024-01-01T00:00:00.000Z",
        )
        .await;

        let out = TempDir::new().unwrap();
        let summary = download_all(&client_for(&server), &["FOLDER1"], out.path(), ExportPreset::TextOnly)
            .await
            .unwrap();

        match &summary.results[0].status {
            DownloadStatus::Failure { reason } => assert!(reason.contains("not supported")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_reference_fails_without_a_request() {
        let server = Server::new_async().await;
        let out = TempDir::new().unwrap();

        let summary = download_all(&client_for(&server), &["   "], out.path(), ExportPreset::TextOnly)
            .await
            .unwrap();

        assert_eq!(summary.total(), 1);
        assert_eq!(summary.success_count(), 0);
    }

    #[tokio::test]
    async fn unauthorized_aborts_the_batch() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/files/A")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(json!({"error": {"code": 401, "message": "Invalid Credentials"}}).to_string())
            .create_async()
            .await;
        let never = server
            .mock("GET", "/files/B")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let out = TempDir::new().unwrap();
        let err = download_all(&client_for(&server), &["A", "B"], out.path(), ExportPreset::TextOnly)
            .await
            .unwrap_err();

        assert!(err.is_auth_failure());
        never.assert_async().await;
    }

    #[tokio::test]
    async fn pdf_preset_and_name_sanitizing() {
        let mut server = Server::new_async().await;
        mock_metadata(
            &mut server,
            "DECK1",
            "Q1/Q2 review",
            "application/vnd.google-apps.presentation",
            "2024-01-01T00:00:00.000Z",
        )
        .await;
        server
            .mock("GET", "/files/DECK1/export")
            .match_query(Matcher::UrlEncoded("mimeType".into(), "application/pdf".into()))
            .with_status(200)
            .with_body("pdf-bytes")
            .create_async()
            .await;

        let out = TempDir::new().unwrap();
        let summary = download_all(&client_for(&server), &["DECK1"], out.path(), ExportPreset::Pdf)
            .await
            .unwrap();

        assert_eq!(summary.success_count(), 1);
        assert!(out.path().join("Q1_Q2 review.pdf").exists());
    }

    #[tokio::test]
    async fn output_dir_is_created() {
        let server = Server::new_async().await;
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("nested").join("drive_files");

        download_all::<&str>(&client_for(&server), &[], &out, ExportPreset::TextOnly)
            .await
            .unwrap();
        assert!(out.is_dir());
    }
}

mod metadata_index {
    use super::*;

    #[tokio::test]
    async fn index_lists_downloaded_files() {
        let mut server = Server::new_async().await;
        mock_metadata(&mut server, "A", "a.txt", "text/plain", "2024-01-01T00:00:00.000Z").await;
        mock_metadata(&mut server, "B", "b.txt", "text/plain", "2024-05-01T00:00:00.000Z").await;
        for id in ["A", "B"] {
            server
                .mock("GET", format!("/files/{}", id).as_str())
                .match_query(Matcher::UrlEncoded("alt".into(), "media".into()))
                .with_status(200)
                .with_body("x")
                .create_async()
                .await;
        }

        let out = TempDir::new().unwrap();
        let summary = download_all(&client_for(&server), &["A", "B"], out.path(), ExportPreset::TextOnly)
            .await
            .unwrap();

        let path = write_metadata_index(out.path(), &summary.downloaded()).unwrap();
        assert_eq!(path, out.path().join(METADATA_INDEX_FILE));

        let index = fs::read_to_string(path).unwrap();
        assert!(index.starts_with("# Downloaded Files Metadata"));
        assert!(index.find("## b.txt").unwrap() < index.find("## a.txt").unwrap());
        assert!(index.contains("- **Type**: text/plain"));
    }
}
