//! PresentationML parts: reading the layout/master hierarchy and writing slides.
//!
//! Reading produces owned values ([`ShapeTree`], [`LayoutEntry`], ...) that hold
//! no reference into the [`Package`](crate::container::Package) they came from.
//! Writing goes through [`Deck`], the in-memory deck the generator edits.

pub mod deck;
pub mod defaults;
pub mod parts;
pub mod shapes;
pub mod writer;

pub use deck::Deck;
pub use parts::{LayoutEntry, MasterPart, PresentationInfo, SlidePart, SlideRef};
pub use shapes::{ColorSpec, PlaceholderRef, Shape, ShapeTree, TextBody, TextParagraph, TextRun};
pub use writer::{ImagePlacement, SlideDraft, SlideImage, TextFill, TextStyle};

use quick_xml::events::attributes::Attribute;
use quick_xml::events::BytesStart;

fn attribute_text(attr: &Attribute<'_>) -> String {
    attr.unescape_value()
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned())
}

/// Value of the attribute with exactly this qualified name.
pub(crate) fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| attribute_text(&a))
}

/// Value of the first attribute with this local name, any prefix.
pub(crate) fn attr_local(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == local)
        .map(|a| attribute_text(&a))
}

/// The relationship id attribute (`r:id`), told apart from a plain `id`.
pub(crate) fn rel_id_attr(e: &BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.prefix().is_some() && a.key.local_name().as_ref() == b"id")
        .map(|a| attribute_text(&a))
}

/// Numeric attribute by exact name.
pub(crate) fn attr_num<T: std::str::FromStr>(e: &BytesStart<'_>, key: &[u8]) -> Option<T> {
    attr(e, key).and_then(|v| v.trim().parse().ok())
}
