// Object key construction
// Decision: The client-supplied file name contributes at most a short lowercase
// extension; the rest of the key is a server-generated UUIDv7 under a validated folder
// Decision: Folders are a small fixed alphabet so a key can never climb out of its prefix

use uuid::Uuid;

/// Document types accepted in addition to any `image/*`
pub const ACCEPTED_DOCUMENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

pub const MAX_EXTENSION_CHARS: usize = 10;
pub const MAX_FOLDER_SEGMENTS: usize = 4;
pub const MAX_FOLDER_SEGMENT_CHARS: usize = 64;

pub fn is_accepted_mime_type(mime_type: &str) -> bool {
    let mime_type = mime_type.trim().to_ascii_lowercase();
    match mime_type.strip_prefix("image/") {
        Some(subtype) => !subtype.is_empty(),
        None => ACCEPTED_DOCUMENT_TYPES.contains(&mime_type.as_str()),
    }
}

/// Lowercase extension of the last path component, if it is short and alphanumeric
pub fn extension(file_name: &str) -> Option<String> {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty()
        || ext.is_empty()
        || ext.len() > MAX_EXTENSION_CHARS
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment.len() <= MAX_FOLDER_SEGMENT_CHARS
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

pub fn is_valid_folder(folder: &str) -> bool {
    let segments: Vec<&str> = folder.split('/').collect();
    segments.len() <= MAX_FOLDER_SEGMENTS && segments.iter().all(|s| is_valid_segment(s))
}

/// `{folder}/{uuid}[.{ext}]`
pub fn object_key(folder: &str, file_name: &str) -> String {
    let id = Uuid::now_v7();
    match extension(file_name) {
        Some(ext) => format!("{folder}/{id}.{ext}"),
        None => format!("{folder}/{id}"),
    }
}

/// Whether `key` has the shape produced by [`object_key`]
pub fn is_valid_key(key: &str) -> bool {
    let Some((folder, name)) = key.rsplit_once('/') else {
        return false;
    };
    if !is_valid_folder(folder) {
        return false;
    }

    let (id, ext) = match name.split_once('.') {
        Some((id, ext)) => (id, Some(ext)),
        None => (name, None),
    };
    let ext_ok = ext.map_or(true, |ext| {
        !ext.is_empty()
            && ext.len() <= MAX_EXTENSION_CHARS
            && ext
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    });

    ext_ok && Uuid::try_parse(id).is_ok()
}
