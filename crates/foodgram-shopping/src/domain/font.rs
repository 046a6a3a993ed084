//! Embedded Unicode font for the shopping list.
//!
//! DejaVu Sans is embedded as a composite (`Type0`) font with `Identity-H`
//! encoding: every character is written as its two-byte glyph id. The glyphs
//! actually used are tracked so the document can carry their widths and a
//! `ToUnicode` map for text extraction and search.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use ttf_parser::{Face, GlyphId};

use super::render::RenderError;

const FONT_DATA: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
const FONT_NAME: &str = "DejaVuSans";

/// Widths and bounding boxes in PDF glyph space are per 1000 em units.
const GLYPH_SPACE: i64 = 1000;

/// Upper bound of `bfchar` entries per block in a CMap.
const CMAP_BLOCK: usize = 100;

pub(crate) struct UnicodeFont {
    face: Face<'static>,
    /// Glyph id to the character it was used for.
    used: BTreeMap<u16, char>,
}

impl UnicodeFont {
    pub(crate) fn load() -> Result<Self, RenderError> {
        let face = Face::parse(FONT_DATA, 0).map_err(|e| RenderError::Font(e.to_string()))?;
        Ok(Self {
            face,
            used: BTreeMap::new(),
        })
    }

    /// Encodes `text` as big-endian glyph ids. Characters the font lacks map
    /// to glyph 0 (`.notdef`).
    pub(crate) fn encode(&mut self, text: &str) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(text.len() * 2);
        for c in text.chars() {
            let GlyphId(id) = self.face.glyph_index(c).unwrap_or(GlyphId(0));
            if id != 0 {
                self.used.entry(id).or_insert(c);
            }
            bytes.extend_from_slice(&id.to_be_bytes());
        }
        bytes
    }

    fn scale(&self, units: i64) -> i64 {
        units * GLYPH_SPACE / i64::from(self.face.units_per_em())
    }

    /// `W` array: `[gid [width] gid [width] ...]` for every used glyph.
    fn widths(&self) -> Vec<Object> {
        let mut widths = Vec::with_capacity(self.used.len() * 2);
        for &id in self.used.keys() {
            let advance = self.face.glyph_hor_advance(GlyphId(id)).unwrap_or(0);
            widths.push(Object::from(id));
            widths.push(Object::Array(vec![Object::Integer(
                self.scale(i64::from(advance)),
            )]));
        }
        widths
    }

    fn to_unicode(&self) -> Vec<u8> {
        let mut cmap = String::from(
            "/CIDInit /ProcSet findresource begin\n\
             12 dict begin\n\
             begincmap\n\
             /CIDSystemInfo <<\n\
             /Registry (Adobe)\n\
             /Ordering (UCS)\n\
             /Supplement 0\n\
             >> def\n\
             /CMapName /Adobe-Identity-UCS def\n\
             /CMapType 2 def\n\
             1 begincodespacerange\n\
             <0000> <FFFF>\n\
             endcodespacerange\n",
        );
        let entries: Vec<(&u16, &char)> = self.used.iter().collect();
        for block in entries.chunks(CMAP_BLOCK) {
            let _ = writeln!(cmap, "{} beginbfchar", block.len());
            for (id, c) in block {
                let mut units = [0u16; 2];
                let target: String = c
                    .encode_utf16(&mut units)
                    .iter()
                    .map(|unit| format!("{unit:04X}"))
                    .collect();
                let _ = writeln!(cmap, "<{id:04X}> <{target}>");
            }
            cmap.push_str("endbfchar\n");
        }
        cmap.push_str(
            "endcmap\n\
             CMapName currentdict /CMap defineresource pop\n\
             end\n\
             end\n",
        );
        cmap.into_bytes()
    }

    /// Adds the font program, descriptor and font dictionaries to `doc` and
    /// returns the id of the `Type0` font.
    pub(crate) fn embed(&self, doc: &mut Document) -> ObjectId {
        let bbox = self.face.global_bounding_box();
        let ascent = self.scale(i64::from(self.face.ascender()));
        let descent = self.scale(i64::from(self.face.descender()));
        let cap_height = self
            .face
            .capital_height()
            .map_or(ascent, |height| self.scale(i64::from(height)));

        let file_id = doc.add_object(Stream::new(
            dictionary! { "Length1" => i64::try_from(FONT_DATA.len()).unwrap_or(i64::MAX) },
            FONT_DATA.to_vec(),
        ));
        let descriptor_id = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => FONT_NAME,
            "Flags" => 32,
            "FontBBox" => vec![
                Object::Integer(self.scale(i64::from(bbox.x_min))),
                Object::Integer(self.scale(i64::from(bbox.y_min))),
                Object::Integer(self.scale(i64::from(bbox.x_max))),
                Object::Integer(self.scale(i64::from(bbox.y_max))),
            ],
            "ItalicAngle" => 0,
            "Ascent" => ascent,
            "Descent" => descent,
            "CapHeight" => cap_height,
            "StemV" => 80,
            "FontFile2" => file_id,
        });
        let cid_font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => FONT_NAME,
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => 0,
            },
            "FontDescriptor" => descriptor_id,
            "DW" => GLYPH_SPACE,
            "W" => self.widths(),
            "CIDToGIDMap" => "Identity",
        });
        let to_unicode_id = doc.add_object(Stream::new(dictionary! {}, self.to_unicode()));
        doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => FONT_NAME,
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(cid_font_id)],
            "ToUnicode" => to_unicode_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyrillic_and_latin_map_to_distinct_glyphs() {
        // Arrange
        let mut font = UnicodeFont::load().unwrap();

        // Act
        let flour = font.encode("Мука");
        let salt = font.encode("Соль");

        // Assert
        assert_eq!(flour.len(), 8);
        assert_ne!(flour, salt);
        assert!(!flour.chunks(2).any(|glyph| glyph == [0, 0]));
        assert_eq!(font.used.len(), 8);
    }

    #[test]
    fn test_missing_characters_use_notdef() {
        let mut font = UnicodeFont::load().unwrap();

        let encoded = font.encode("\u{10FFFD}");

        assert_eq!(encoded, vec![0, 0]);
        assert!(font.used.is_empty());
    }

    #[test]
    fn test_to_unicode_lists_used_glyphs() {
        // Arrange
        let mut font = UnicodeFont::load().unwrap();
        let encoded = font.encode("г€");

        // Act
        let cmap = String::from_utf8(font.to_unicode()).unwrap();

        // Assert
        let gram = format!("<{:02X}{:02X}> <0433>", encoded[0], encoded[1]);
        let euro = format!("<{:02X}{:02X}> <20AC>", encoded[2], encoded[3]);
        assert!(cmap.contains("2 beginbfchar"));
        assert!(cmap.contains(&gram));
        assert!(cmap.contains(&euro));
    }
}
