//! Device profile mutations.

use edgex_transit::Value;
use edgex_ui_config::ServiceName;
use tracing::warn;

use crate::dispatch::{Args, HandlerError};
use crate::upstream::FilePart;

use super::HANDLERS_TARGET;
use super::context::Services;

const YAML_CONTENT_TYPE: &str = "application/x-yaml";

/// Sends upload `:file-id` to core-metadata as a profile definition.
///
/// The scratch file is removed afterwards whether or not the upload was
/// accepted.
pub(super) async fn upload(services: &Services, args: &Args) -> Result<Value, HandlerError> {
    let raw_id = args.int("file-id")?;
    let file_id = u64::try_from(raw_id)
        .map_err(|_| HandlerError::invalid_argument("file-id", "must not be negative"))?;
    let file_name = format!("tmp-{file_id}");
    let path = services.upload_dir.join(&file_name);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|source| HandlerError::Upload { file_id, source })?;

    let file = FilePart {
        field: "file".to_owned(),
        file_name,
        content_type: YAML_CONTENT_TYPE.to_owned(),
        bytes,
    };
    let target = services.target(ServiceName::Metadata, "deviceprofile/uploadfile");
    let result = services.downstream.post_file(target, file).await;

    if let Err(error) = tokio::fs::remove_file(&path).await {
        warn!(
            target: HANDLERS_TARGET,
            path = %path.display(),
            error = %error,
            "failed to remove uploaded profile"
        );
    }
    result?;
    Ok(Value::Int(raw_id))
}

pub(super) async fn delete(services: &Services, args: &Args) -> Result<Value, HandlerError> {
    let id = args.keyword("id")?;
    let path = format!("deviceprofile/id/{}", id.as_str());
    services
        .downstream
        .delete(services.target(ServiceName::Metadata, &path))
        .await?;
    Ok(Value::Keyword(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rstest::rstest;
    use tempfile::TempDir;

    use crate::handlers::tests::{args, services_with};
    use crate::upstream::testing::FakeUpstream;
    use crate::upstream::{Method, RequestBody};

    #[rstest]
    #[tokio::test]
    async fn uploads_yaml_and_removes_the_scratch_file() {
        let dir = TempDir::new().expect("create temp dir");
        std::fs::write(dir.path().join("tmp-3"), "name: thermo\n").expect("write upload");
        let fake = Arc::new(FakeUpstream::new());
        fake.respond(
            Method::Post,
            "http://localhost:48081/api/v1/deviceprofile/uploadfile",
            200,
            "p-1",
        );
        let mut services = services_with(Arc::clone(&fake));
        services.upload_dir = dir.path().to_owned();

        let result = upload(&services, &args(vec![("file-id", Value::Int(3))])).await.ok();

        assert_eq!(result, Some(Value::Int(3)));
        assert!(!dir.path().join("tmp-3").exists());
        let body = fake.requests().first().map(|r| r.body.clone());
        assert!(matches!(
            body,
            Some(RequestBody::File(FilePart { ref field, ref content_type, ref bytes, .. }))
                if field == "file" && content_type == YAML_CONTENT_TYPE && bytes.as_slice() == b"name: thermo\n"
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_upload_is_reported() {
        let dir = TempDir::new().expect("create temp dir");
        let fake = Arc::new(FakeUpstream::new());
        let mut services = services_with(Arc::clone(&fake));
        services.upload_dir = dir.path().to_owned();

        let result = upload(&services, &args(vec![("file-id", Value::Int(8))])).await;

        assert!(matches!(result, Err(HandlerError::Upload { file_id: 8, .. })));
        assert!(fake.calls().is_empty());
    }
}
