use crate::launcher::state::FormState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use common::requests::SheetSummary;
use common::sheet::{self, read_table};
use futures_util::StreamExt;
use log::info;
use md5::Context;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// HTTP handler wrapper that converts the internal result to an `HttpResponse`.
///
/// - On success: `200 OK` with the `SheetSummary` as JSON.
/// - On failure: `400 Bad Request` with the error message.
pub async fn process(state: web::Data<FormState>, payload: Multipart) -> impl Responder {
    match upload_sheet(&state.settings.upload_dir, payload).await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => HttpResponse::BadRequest().body(format!("Error: {}", e)),
    }
}

/// Extension of `file_name`, lowercased, if it is one the reader supports.
fn supported_extension(file_name: &str) -> Option<String> {
    if !sheet::is_supported(file_name) {
        return None;
    }
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Maps a `sheet_id` handed out by the upload back to the stored file.
///
/// Ids are `<md5 hex>.<ext>`; anything else is rejected so a request cannot
/// point the sender at arbitrary paths.
pub fn resolve_sheet(upload_dir: &Path, sheet_id: &str) -> Result<PathBuf, String> {
    let (hash, ext) = sheet_id
        .split_once('.')
        .ok_or_else(|| "Invalid spreadsheet id".to_string())?;
    let valid_hash = hash.len() == 32 && hash.chars().all(|c| c.is_ascii_hexdigit());
    let valid_ext = !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric());
    if !valid_hash || !valid_ext {
        return Err("Invalid spreadsheet id".to_string());
    }
    let path = upload_dir.join(sheet_id);
    if !path.is_file() {
        return Err("Spreadsheet not found, please upload it again".to_string());
    }
    Ok(path)
}

/// Streams the `file` field to disk, names it by its MD5 and reads its headers.
pub async fn upload_sheet(
    upload_dir: &Path,
    mut payload: Multipart,
) -> Result<SheetSummary, String> {
    fs::create_dir_all(upload_dir).map_err(|e| e.to_string())?;

    let mut stored: Option<(String, PathBuf)> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| e.to_string())?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));
        if name.as_deref() != Some("file") {
            continue;
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .unwrap_or_default();
        let ext = supported_extension(&file_name)
            .ok_or("The file must be an Excel workbook (.xlsx, .xls) or a .csv file")?;

        let part_path = upload_dir.join(format!(".{}.part", Uuid::new_v4().simple()));
        let mut writer = BufWriter::new(File::create(&part_path).map_err(|e| e.to_string())?);
        let mut md5_hasher = Context::new();
        let mut size = 0usize;

        while let Some(chunk) = field.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    let _ = fs::remove_file(&part_path);
                    return Err(e.to_string());
                }
            };
            md5_hasher.consume(&chunk);
            size += chunk.len();
            writer.write_all(&chunk).map_err(|e| e.to_string())?;
        }
        writer.flush().map_err(|e| e.to_string())?;
        drop(writer);

        if size == 0 {
            let _ = fs::remove_file(&part_path);
            return Err("The uploaded file is empty".to_string());
        }

        let sheet_id = format!("{:x}.{}", md5_hasher.finalize(), ext);
        let final_path = upload_dir.join(&sheet_id);
        fs::rename(&part_path, &final_path).map_err(|e| e.to_string())?;
        info!("stored upload {} as {}", file_name, sheet_id);
        stored = Some((file_name, final_path));
    }

    let (file_name, path) = stored.ok_or("Missing file")?;
    summarize(file_name, path).await
}

/// Reads the stored spreadsheet off the async runtime and reports its shape.
async fn summarize(file_name: String, path: PathBuf) -> Result<SheetSummary, String> {
    let sheet_id = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or("Invalid stored file name")?;

    let table = web::block(move || read_table(&path))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| format!("Failed to load spreadsheet: {}", e))?;

    if table.headers.is_empty() {
        return Err("The spreadsheet has no columns".to_string());
    }

    Ok(SheetSummary {
        sheet_id,
        file_name,
        headers: table.headers,
        rows: table.rows.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn extension_must_be_readable() {
        assert_eq!(supported_extension("Contacts.XLSX"), Some("xlsx".to_string()));
        assert_eq!(supported_extension("list.csv"), Some("csv".to_string()));
        assert_eq!(supported_extension("photo.png"), None);
        assert_eq!(supported_extension(""), None);
    }

    #[test]
    fn resolve_rejects_path_tricks() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_sheet(dir.path(), "../etc/passwd").is_err());
        assert!(resolve_sheet(dir.path(), &format!("{}./x", HASH)).is_err());
        assert!(resolve_sheet(dir.path(), "short.csv").is_err());
        assert!(resolve_sheet(dir.path(), HASH).is_err());
    }

    #[test]
    fn resolve_finds_stored_upload() {
        let dir = tempfile::tempdir().unwrap();
        let id = format!("{}.csv", HASH);
        assert!(resolve_sheet(dir.path(), &id)
            .unwrap_err()
            .starts_with("Spreadsheet not found"));

        std::fs::write(dir.path().join(&id), "Phone\n1\n").unwrap();
        assert_eq!(resolve_sheet(dir.path(), &id).unwrap(), dir.path().join(&id));
    }

    #[actix_rt::test]
    async fn summarize_reports_headers_and_row_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(format!("{}.csv", HASH));
        std::fs::write(&path, "Name,Phone,Amount\nAli,0300,500\nSara,0301,200\n").unwrap();

        let summary = summarize("contacts.csv".to_string(), path).await.unwrap();
        assert_eq!(summary.sheet_id, format!("{}.csv", HASH));
        assert_eq!(summary.file_name, "contacts.csv");
        assert_eq!(summary.headers, vec!["Name", "Phone", "Amount"]);
        assert_eq!(summary.rows, 2);
    }
}
