use mongodb::bson::{Binary, Bson, Document, doc, spec::BinarySubtype};
use mongodb::error::{Error, ErrorKind, WriteFailure};
use uuid::Uuid;

/// Server error code for a unique index violation.
pub const DUPLICATE_KEY_CODE: i32 = 11000;

/// Encode `id` the way the driver stores a `Uuid` field.
///
/// Documents are written through the raw serializer, which emits UUIDs as generic
/// binary; `doc!`/`to_bson` would produce a string and never match. Every filter on
/// an id goes through here.
pub fn uuid_bson(id: Uuid) -> Bson {
    Bson::Binary(Binary {
        subtype: BinarySubtype::Generic,
        bytes: id.as_bytes().to_vec(),
    })
}

/// `{"$in": [...]}` over a set of ids.
pub fn uuid_in(ids: &[Uuid]) -> Document {
    let ids: Vec<Bson> = ids.iter().copied().map(uuid_bson).collect();
    doc! { "$in": ids }
}

/// Case-insensitive substring match on user-supplied text, with regex syntax escaped.
pub fn contains_ci(term: &str) -> Document {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if "\\^$.|?*+()[]{}".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    doc! { "$regex": escaped, "$options": "i" }
}

/// Whether `error` is a unique index violation.
pub fn is_duplicate_key(error: &Error) -> bool {
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}
