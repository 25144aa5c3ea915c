use super::output_path;
use crate::session::Session;
use bytes::Bytes;
use docvault_client::{DeleteOutcome, DocumentUpdate, DocumentUpload, FilePart, ToggleOutcome};
use docvault_config::VaultConfig;
use docvault_core::{file_type_label, Document, Error, Result};
use docvault_utils::format_file_size;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

pub async fn list(config: &VaultConfig) -> Result<()> {
    let session = Session::connect(config).await?;
    let documents = session.controller.documents().snapshot();

    if documents.is_empty() {
        println!("No documents yet");
        return Ok(());
    }
    for document in &documents {
        println!("{}", render_row(document));
    }
    Ok(())
}

pub async fn toggle(config: &VaultConfig, id: &str) -> Result<()> {
    let session = Session::connect(config).await?;
    let id = docvault_core::DocumentId::new(id);

    match session.controller.toggle_privacy(&id).await? {
        ToggleOutcome::Committed { is_public } => {
            println!("{id} is now {}", visibility(is_public));
            Ok(())
        }
        ToggleOutcome::RolledBack { previous, error } => {
            eprintln!("{id} stays {}", visibility(previous));
            Err(error)
        }
        // A single invocation issues one toggle
        ToggleOutcome::Superseded { .. } => Ok(()),
    }
}

pub async fn delete(config: &VaultConfig, id: &str, yes: bool) -> Result<()> {
    let session = Session::connect(config).await?;
    let id = session.open_menu(id)?;

    let outcome = session
        .controller
        .delete(&id, |document| yes || confirm_delete(document))
        .await?;
    match outcome {
        DeleteOutcome::Deleted(document) => println!("Deleted {}", document.display_name()),
        DeleteOutcome::Cancelled => println!("Cancelled"),
    }
    Ok(())
}

pub async fn download(config: &VaultConfig, id: &str, output: Option<PathBuf>) -> Result<()> {
    let session = Session::connect(config).await?;
    let id = session.open_menu(id)?;

    let file = session.controller.download(&id).await?;
    let path = output_path(output.as_deref(), &file.filename, &format!("document-{id}"));
    tokio::fs::write(&path, &file.bytes)
        .await
        .map_err(|e| Error::file_system(&path, "write", e))?;

    println!("Saved {} ({})", path.display(), format_file_size(file.bytes.len() as u64));
    Ok(())
}

pub async fn upload(
    config: &VaultConfig,
    path: &Path,
    category: String,
    name: Option<String>,
) -> Result<()> {
    let session = Session::connect(config).await?;
    let upload = DocumentUpload {
        file: read_file(path).await?,
        category,
        filename: name,
    };

    let document = session.controller.upload(upload).await?;
    println!("Uploaded {} as {}", document.display_name(), document.id);
    Ok(())
}

pub async fn edit(
    config: &VaultConfig,
    id: &str,
    file: Option<&Path>,
    category: Option<String>,
    name: Option<String>,
) -> Result<()> {
    let session = Session::connect(config).await?;
    let id = session.open_menu(id)?;
    session.controller.edit(&id)?;

    let file = match file {
        Some(path) => Some(read_file(path).await?),
        None => None,
    };
    let update = DocumentUpdate {
        file,
        category,
        filename: name,
    };

    let document = session.controller.save_edit(&id, update).await?;
    println!("Updated {}", render_row(&document));
    Ok(())
}

async fn read_file(path: &Path) -> Result<FilePart> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Error::file_system(path, "read", e))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    Ok(FilePart {
        content_type: content_type_for(path).to_string(),
        filename,
        bytes: Bytes::from(bytes),
    })
}

/// Best guess at a content type from the file extension
fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "txt" | "log" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

fn visibility(is_public: bool) -> &'static str {
    if is_public {
        "public"
    } else {
        "private"
    }
}

fn render_row(document: &Document) -> String {
    format!(
        "{:<8} {:<7} {:<6} {:>10}  {:<16} {}",
        document.id.as_str(),
        visibility(document.is_public),
        file_type_label(&document.content_type),
        format_file_size(document.size),
        document.category_or_default(),
        document.display_name(),
    )
}

fn confirm_delete(document: &Document) -> bool {
    print!("Delete '{}'? This cannot be undone. [y/N] ", document.display_name());
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(_) => is_affirmative(&answer),
        Err(_) => false,
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
