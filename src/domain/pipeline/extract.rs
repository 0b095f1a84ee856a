//! Extract phase: reads the source file (bare JSON or TAR/TAR.GZ), decodes
//! a `RawExport`, and validates its shape. Single-threaded, blocking I/O.

use crate::data::error::EtlError;
use crate::data::types::{Phase, RawExport};
use crate::domain::progress::PhaseStatus;
use crate::domain::validate::validate_raw_export;
use crate::utils::archive::{self, SourceKind};

use super::super::context::EtlContext;

pub async fn run(ctx: &mut EtlContext) -> Result<(), EtlError> {
    ctx.start_phase(Phase::Extract, 0, "conversations");

    let result = extract_raw_export(ctx).await;

    match result {
        Ok(raw) => {
            if let Err(e) = validate_raw_export(&raw) {
                ctx.record_error(Phase::Extract, e.to_string(), None, true);
                return Err(EtlError::validation(e.to_string()));
            }

            ctx.update_progress(raw.conversations.len());
            ctx.user_id = Some(raw.user_id.clone());
            ctx.export_date = Some(raw.export_date.clone());
            if ctx.user_display_name.is_none() {
                ctx.user_display_name = ctx.config.user_display_name.clone();
            }
            ctx.raw_data = Some(raw);
            ctx.end_phase(PhaseStatus::Completed);
            Ok(())
        }
        Err(e) => {
            ctx.record_error(Phase::Extract, e.to_string(), None, true);
            Err(e)
        }
    }
}

async fn extract_raw_export(ctx: &EtlContext) -> Result<RawExport, EtlError> {
    let path = ctx.file_source.clone();
    let bytes = tokio::task::spawn_blocking(move || archive::read_source(&path))
        .await
        .map_err(|e| EtlError::extraction(format!("extract task panicked: {e}")))?
        .map_err(|e| EtlError::extraction(format!("failed to read source: {e}")))?;

    let kind = archive::detect_source_kind(&bytes);
    let document = match kind {
        SourceKind::Json => bytes,
        SourceKind::Tar | SourceKind::TarGz => {
            let members = archive::list_json_members(&bytes, kind)
                .map_err(|e| EtlError::extraction(format!("failed to read archive: {e}")))?;
            if members.is_empty() {
                return Err(EtlError::extraction("archive contains no .json entries"));
            }
            let member = archive::select_member(
                &members,
                ctx.config.archive_member.as_deref(),
                ctx.config.archive_index,
            )
            .ok_or_else(|| EtlError::extraction("no archive member matched the requested selector"))?;
            member.contents.clone()
        }
    };

    RawExport::normalize(&document).map_err(|e| EtlError::extraction(format!("invalid export JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{DatabaseConfig, EtlConfig, PipelineConfig};
    use std::io::Write;

    fn test_config(output_dir: std::path::PathBuf, source_path: std::path::PathBuf) -> EtlConfig {
        EtlConfig {
            database: DatabaseConfig {
                url: "postgres://localhost/test".into(),
                max_connections: 1,
                min_connections: 1,
                acquire_timeout_secs: 1,
                idle_timeout_secs: 1,
                max_lifetime_secs: 1,
                statement_timeout_secs: 1,
            },
            pipeline: PipelineConfig {
                output_dir,
                chunk_size: 10,
                batch_size: 10,
                max_workers: 1,
                parallel_processing: false,
                memory_limit_mb: 128,
                extract_timeout_secs: 10,
                transform_timeout_secs: 10,
                load_timeout_secs: 10,
                task_id: "task-1".into(),
            },
            source_path,
            user_display_name: None,
            archive_member: None,
            archive_index: None,
            debug: false,
        }
    }

    #[tokio::test]
    async fn extracts_plain_json_export() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("export.json");
        let mut file = std::fs::File::create(&source).unwrap();
        write!(file, r#"{{"userId": "u1", "exportDate": "2023-01-01T00:00:00Z", "conversations": []}}"#).unwrap();

        let config = test_config(dir.path().to_path_buf(), source.clone());
        let mut ctx = EtlContext::new(config, source);
        run(&mut ctx).await.unwrap();

        assert_eq!(ctx.user_id.as_deref(), Some("u1"));
        assert!(ctx.raw_data.is_some());
    }

    #[tokio::test]
    async fn rejects_missing_user_id() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("export.json");
        std::fs::write(&source, r#"{"userId": "", "exportDate": "2023-01-01T00:00:00Z", "conversations": []}"#).unwrap();

        let config = test_config(dir.path().to_path_buf(), source.clone());
        let mut ctx = EtlContext::new(config, source);
        assert!(run(&mut ctx).await.is_err());
    }
}
