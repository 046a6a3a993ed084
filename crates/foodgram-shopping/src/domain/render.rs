//! PDF rendering of a shopping list.
//!
//! The document is an A4 table with a bordered header row
//! (`Name | Amount | Units | Bought`) and one bordered row per grocery line.
//! Before each row the remaining height is checked; when less than two rows
//! fit, a new page is started and the header is drawn again. Text is set in
//! an embedded Unicode font, so ingredient names in any script the font
//! covers print as written.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};
use thiserror::Error;

use super::font::UnicodeFont;
use super::grocery::GroceryLine;

/// File name suggested to the client.
pub const SHOPPING_LIST_FILE_NAME: &str = "ShoppingCart.pdf";

/// Media type of the rendered document.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 40;
const ROW_HEIGHT: i64 = 20;
const TITLE_SIZE: i64 = 16;
const FONT_SIZE: i64 = 10;
const TEXT_PADDING: i64 = 5;
const CHECKBOX_SIZE: i64 = 10;
const MAX_NAME_CHARS: usize = 48;
const HEADER_GRAY: f32 = 0.85;

/// Column titles and widths; the name column takes what the others leave.
const COLUMNS: [(&str, i64); 4] = [
    ("Name", PAGE_WIDTH - 2 * MARGIN - 3 * 85),
    ("Amount", 85),
    ("Units", 85),
    ("Bought", 85),
];

/// Errors raised while rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// There is nothing to print.
    #[error("The shopping list is empty")]
    EmptyList,

    /// The embedded font could not be read.
    #[error("failed to load font: {0}")]
    Font(String),

    /// The PDF library failed to encode the document.
    #[error("failed to build PDF: {0}")]
    Pdf(String),
}

/// Renders the lines, sorted by name then unit, into PDF bytes.
///
/// # Errors
///
/// Returns `RenderError::EmptyList` for an empty slice and
/// `RenderError::Font` or `RenderError::Pdf` if encoding fails.
pub fn render_shopping_list(lines: &[GroceryLine]) -> Result<Vec<u8>, RenderError> {
    if lines.is_empty() {
        return Err(RenderError::EmptyList);
    }
    let mut sorted: Vec<&GroceryLine> = lines.iter().collect();
    sorted.sort_by(|a, b| {
        a.name
            .as_bytes()
            .cmp(b.name.as_bytes())
            .then_with(|| a.measurement_unit.as_bytes().cmp(b.measurement_unit.as_bytes()))
    });

    let mut layout = Layout::new(UnicodeFont::load()?);
    for line in sorted {
        layout.row(line);
    }
    let (pages, font) = layout.finish();
    build_document(pages, &font)
}

/// Page-by-page drawing state.
struct Layout {
    font: UnicodeFont,
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    cursor: i64,
}

impl Layout {
    fn new(font: UnicodeFont) -> Self {
        let mut layout = Self {
            font,
            pages: Vec::new(),
            current: Vec::new(),
            cursor: PAGE_HEIGHT - MARGIN,
        };
        layout.text(
            TITLE_SIZE,
            MARGIN,
            layout.cursor - TITLE_SIZE,
            "Shopping list",
        );
        layout.cursor -= TITLE_SIZE + ROW_HEIGHT / 2;
        layout.header();
        layout
    }

    fn remaining(&self) -> i64 {
        self.cursor - MARGIN
    }

    fn new_page(&mut self) {
        let finished = std::mem::take(&mut self.current);
        self.pages.push(finished);
        self.cursor = PAGE_HEIGHT - MARGIN;
        self.header();
    }

    fn header(&mut self) {
        let mut x = MARGIN;
        self.current.extend([
            Operation::new("q", vec![]),
            Operation::new("g", vec![Object::Real(HEADER_GRAY)]),
        ]);
        for (_, width) in COLUMNS {
            self.current.push(Operation::new(
                "re",
                vec![
                    Object::Integer(x),
                    Object::Integer(self.cursor - ROW_HEIGHT),
                    Object::Integer(width),
                    Object::Integer(ROW_HEIGHT),
                ],
            ));
            x += width;
        }
        self.current.extend([
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]);
        let cells = COLUMNS.map(|(title, _)| title.to_owned());
        self.cells(&cells, false);
    }

    fn row(&mut self, line: &GroceryLine) {
        if self.remaining() < 2 * ROW_HEIGHT {
            self.new_page();
        }
        let cells = [
            truncate(&line.name),
            line.amount.to_string(),
            line.measurement_unit.clone(),
            String::new(),
        ];
        self.cells(&cells, true);
    }

    /// Draws one bordered row at the cursor and moves the cursor down.
    fn cells(&mut self, values: &[String; 4], checkbox: bool) {
        let bottom = self.cursor - ROW_HEIGHT;
        let mut x = MARGIN;
        for (value, (_, width)) in values.iter().zip(COLUMNS) {
            self.rect(x, bottom, width, ROW_HEIGHT);
            if !value.is_empty() {
                self.text(
                    FONT_SIZE,
                    x + TEXT_PADDING,
                    bottom + (ROW_HEIGHT - FONT_SIZE) / 2 + 2,
                    value,
                );
            }
            x += width;
        }
        if checkbox {
            let (_, bought_width) = COLUMNS[3];
            self.rect(
                x - (bought_width + CHECKBOX_SIZE) / 2,
                bottom + (ROW_HEIGHT - CHECKBOX_SIZE) / 2,
                CHECKBOX_SIZE,
                CHECKBOX_SIZE,
            );
        }
        self.cursor = bottom;
    }

    fn rect(&mut self, x: i64, y: i64, width: i64, height: i64) {
        self.current.push(Operation::new(
            "re",
            vec![
                Object::Integer(x),
                Object::Integer(y),
                Object::Integer(width),
                Object::Integer(height),
            ],
        ));
        self.current.push(Operation::new("S", vec![]));
    }

    fn text(&mut self, size: i64, x: i64, y: i64, value: &str) {
        let glyphs = self.font.encode(value);
        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(size)]),
            Operation::new("Td", vec![Object::Integer(x), Object::Integer(y)]),
            Operation::new("Tj", vec![Object::String(glyphs, StringFormat::Hexadecimal)]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn finish(mut self) -> (Vec<Vec<Operation>>, UnicodeFont) {
        self.pages.push(self.current);
        (self.pages, self.font)
    }
}

fn truncate(name: &str) -> String {
    if name.chars().count() <= MAX_NAME_CHARS {
        return name.to_owned();
    }
    let mut short: String = name.chars().take(MAX_NAME_CHARS - 3).collect();
    short.push_str("...");
    short
}

fn build_document(pages: Vec<Vec<Operation>>, font: &UnicodeFont) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();
    let font_id = font.embed(&mut doc);
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations }
            .encode()
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = i64::try_from(kids.len()).map_err(|e| RenderError::Pdf(e.to_string()))?;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, unit: &str, amount: i64) -> GroceryLine {
        GroceryLine {
            name: name.to_owned(),
            measurement_unit: unit.to_owned(),
            amount,
        }
    }

    /// Text of every page, one table cell per line.
    fn page_texts(bytes: &[u8]) -> Vec<Vec<String>> {
        let doc = Document::load_mem(bytes).unwrap();
        let pages = doc.get_pages();
        pages
            .keys()
            .map(|number| {
                doc.extract_text(&[*number])
                    .unwrap()
                    .lines()
                    .map(str::to_owned)
                    .collect()
            })
            .collect()
    }

    fn position(cells: &[String], value: &str) -> usize {
        cells.iter().position(|cell| cell == value).unwrap()
    }

    #[test]
    fn test_empty_list_is_signalled() {
        let result = render_shopping_list(&[]);

        assert!(matches!(result, Err(RenderError::EmptyList)));
        assert_eq!(
            RenderError::EmptyList.to_string(),
            "The shopping list is empty"
        );
    }

    #[test]
    fn test_single_page_document_contains_rows() {
        // Arrange
        let lines = vec![line("Salt", "g", 5), line("Flour", "g", 500)];

        // Act
        let bytes = render_shopping_list(&lines).unwrap();

        // Assert
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let pages = page_texts(&bytes);
        assert_eq!(pages.len(), 1);
        let cells = &pages[0];
        assert_eq!(cells[0], "Shopping list");
        assert_eq!(cells[1..5], ["Name", "Amount", "Units", "Bought"]);
        assert_eq!(cells[5..8], ["Flour", "500", "g"]);
        assert_eq!(cells[8..11], ["Salt", "5", "g"]);
    }

    #[test]
    fn test_overflow_repeats_header_on_every_page() {
        // Arrange
        let lines: Vec<GroceryLine> = (0..100)
            .map(|i| line(&format!("Item {i:03}"), "pcs", i))
            .collect();

        // Act
        let bytes = render_shopping_list(&lines).unwrap();

        // Assert
        let pages = page_texts(&bytes);
        assert!(pages.len() >= 3);
        for cells in &pages {
            assert_eq!(cells.iter().filter(|cell| *cell == "Name").count(), 1);
            assert_eq!(cells.iter().filter(|cell| *cell == "Bought").count(), 1);
        }
        let rows: usize = pages
            .iter()
            .map(|cells| cells.iter().filter(|cell| cell.starts_with("Item ")).count())
            .sum();
        assert_eq!(rows, 100);
    }

    #[test]
    fn test_sort_is_case_sensitive_then_by_unit() {
        // Arrange
        let lines = vec![
            line("apple", "pcs", 1),
            line("Milk", "ml", 200),
            line("Milk", "cup", 1),
        ];

        // Act
        let bytes = render_shopping_list(&lines).unwrap();

        // Assert
        let cells = &page_texts(&bytes)[0];
        let cup = position(cells, "cup");
        let ml = position(cells, "ml");
        let apple = position(cells, "apple");
        assert!(cup < ml);
        assert!(ml < apple);
    }

    #[test]
    fn test_cyrillic_names_and_units_print_as_written() {
        // Arrange
        let lines = vec![line("Мука", "г", 500), line("Соль", "г", 5)];

        // Act
        let bytes = render_shopping_list(&lines).unwrap();

        // Assert
        let cells = &page_texts(&bytes)[0];
        assert_eq!(cells[5..8], ["Мука", "500", "г"]);
        assert_eq!(cells[8..11], ["Соль", "5", "г"]);
        assert!(!cells.iter().any(|cell| cell.contains('?')));
    }

    #[test]
    fn test_windows_1252_punctuation_survives() {
        let lines = vec![line("Crème „fraîche“ – 10 €", "ml", 200)];

        let bytes = render_shopping_list(&lines).unwrap();

        let cells = &page_texts(&bytes)[0];
        assert_eq!(cells[5], "Crème „fraîche“ – 10 €");
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let lines = vec![line("Мука", "г", 500), line("Salt", "g", 5)];

        let first = render_shopping_list(&lines).unwrap();
        let second = render_shopping_list(&lines).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_long_names_are_truncated() {
        let long = "x".repeat(60);

        let short = truncate(&long);

        assert_eq!(short.chars().count(), MAX_NAME_CHARS);
        assert!(short.ends_with("..."));
    }
}
