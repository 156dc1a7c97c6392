//! Built-in parts: the blank deck used when no template is given, and the
//! notes master provisioned into templates that lack one.

use crate::container::{Package, CONTENT_TYPES_PART};

const CONTENT_TYPES_XML: &str = include_str!("../../resources/content_types.xml");
const ROOT_RELS_XML: &str = include_str!("../../resources/root.rels");
const PRESENTATION_XML: &str = include_str!("../../resources/presentation.xml");
const PRESENTATION_RELS_XML: &str = include_str!("../../resources/presentation.xml.rels");
const PRES_PROPS_XML: &str = include_str!("../../resources/presProps.xml");
const VIEW_PROPS_XML: &str = include_str!("../../resources/viewProps.xml");
const TABLE_STYLES_XML: &str = include_str!("../../resources/tableStyles.xml");
const SLIDE_MASTER_XML: &str = include_str!("../../resources/slideMaster1.xml");
const SLIDE_MASTER_RELS_XML: &str = include_str!("../../resources/slideMaster1.xml.rels");
const TITLE_LAYOUT_XML: &str = include_str!("../../resources/slideLayout1.xml");
const CONTENT_LAYOUT_XML: &str = include_str!("../../resources/slideLayout2.xml");
const LAYOUT_RELS_XML: &str = include_str!("../../resources/slideLayout.xml.rels");

/// Office theme shared by the blank deck and a provisioned notes master.
pub const THEME_XML: &str = include_str!("../../resources/theme1.xml");

/// Notes master with a slide image and a notes body placeholder.
pub const NOTES_MASTER_XML: &str = include_str!("../../resources/notesMaster1.xml");

/// A presentation with one master, two layouts and no slides.
///
/// Layout 0 is "Title Slide", layout 1 is "Title and Content".
pub fn blank_package() -> Package {
    let parts: [(&str, &str); 14] = [
        (CONTENT_TYPES_PART, CONTENT_TYPES_XML),
        ("_rels/.rels", ROOT_RELS_XML),
        ("ppt/presentation.xml", PRESENTATION_XML),
        ("ppt/_rels/presentation.xml.rels", PRESENTATION_RELS_XML),
        ("ppt/presProps.xml", PRES_PROPS_XML),
        ("ppt/viewProps.xml", VIEW_PROPS_XML),
        ("ppt/tableStyles.xml", TABLE_STYLES_XML),
        ("ppt/theme/theme1.xml", THEME_XML),
        ("ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER_XML),
        ("ppt/slideMasters/_rels/slideMaster1.xml.rels", SLIDE_MASTER_RELS_XML),
        ("ppt/slideLayouts/slideLayout1.xml", TITLE_LAYOUT_XML),
        ("ppt/slideLayouts/slideLayout2.xml", CONTENT_LAYOUT_XML),
        ("ppt/slideLayouts/_rels/slideLayout1.xml.rels", LAYOUT_RELS_XML),
        ("ppt/slideLayouts/_rels/slideLayout2.xml.rels", LAYOUT_RELS_XML),
    ];

    let mut package = Package::new();
    for (name, xml) in parts {
        package.put_xml(name, xml.to_string());
    }
    package
}
