//! PDF Document wrapper

use crate::font::{FontFace, FontFamily, FontWeight, LineMetrics};
use crate::graphics::{
    axial_shading, circle_operators, fill_rect_operators, line_operators, shading_operators,
    stroke_rect_operators,
};
use crate::image::{
    calculate_scaled_dimensions, generate_image_operators, ImageScaleMode, ImageXObject,
};
use crate::output::write_locked;
use crate::text::{generate_text_operators, TextRenderContext};
use crate::{Align, PdfError, Result};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeSet, HashMap};
use std::hash::{Hash, Hasher};
use std::path::Path;

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Parse `#RRGGBB` or `RRGGBB` (case-insensitive)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::from_rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Format as `#RRGGBB`
    pub fn to_hex(&self) -> String {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02X}{:02X}{:02X}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    /// White color
    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// ISO A4 portrait
    pub const A4: PageSize = PageSize {
        width: 595.28,
        height: 841.89,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// Objects written for one embedded font
struct EmbeddedFont {
    /// The font dictionary referenced from page resources
    font_id: ObjectId,
    /// Every object created for the font, including `font_id`
    object_ids: Vec<ObjectId>,
}

/// PDF Document wrapper providing high-level operations
///
/// Coordinates passed to drawing methods are in points with the origin at
/// the top-left corner of the page; conversion to PDF space happens here.
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Root Pages node
    pages_id: ObjectId,
    /// Page object IDs in order
    page_ids: Vec<ObjectId>,
    /// Page dimensions in order
    page_sizes: Vec<PageSize>,
    /// Registered font families
    font_families: HashMap<String, FontFamily>,
    /// Current font family name
    current_family: Option<String>,
    /// Current font weight
    current_weight: FontWeight,
    /// Current font size
    current_font_size: f32,
    /// Current text color
    current_text_color: Color,
    /// Characters drawn with each face (face name -> chars)
    used_chars: HashMap<String, BTreeSet<char>>,
    /// Embedded fonts (face name -> objects)
    embedded_fonts: HashMap<String, EmbeddedFont>,
    /// Page font resources (page number -> face name -> resource name)
    page_font_resources: HashMap<usize, HashMap<String, String>>,
    /// Next font resource number
    next_font_resource: u32,
    /// Embedded images (data hash -> object ID, pixel width, pixel height)
    embedded_images: HashMap<u64, (ObjectId, u32, u32)>,
    /// Page image resources (page number -> object ID -> resource name)
    page_image_resources: HashMap<usize, HashMap<ObjectId, String>>,
    /// Next image resource number
    next_image_resource: u32,
    /// Next shading resource number
    next_shading_resource: u32,
    /// Buffered content operators per page (page number -> operators)
    page_content_buffer: HashMap<usize, Vec<u8>>,
    /// Document information dictionary entries
    info: Dictionary,
    info_id: Option<ObjectId>,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    /// Create an empty document with no pages
    pub fn new() -> Self {
        let mut inner = Document::with_version("1.7");

        let pages_id = inner.new_object_id();
        inner.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0,
            }),
        );
        let catalog_id = inner.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        inner.trailer.set("Root", catalog_id);

        Self {
            inner,
            pages_id,
            page_ids: Vec::new(),
            page_sizes: Vec::new(),
            font_families: HashMap::new(),
            current_family: None,
            current_weight: FontWeight::default(),
            current_font_size: 12.0,
            current_text_color: Color::default(),
            used_chars: HashMap::new(),
            embedded_fonts: HashMap::new(),
            page_font_resources: HashMap::new(),
            next_font_resource: 1,
            embedded_images: HashMap::new(),
            page_image_resources: HashMap::new(),
            next_image_resource: 1,
            next_shading_resource: 1,
            page_content_buffer: HashMap::new(),
            info: Dictionary::new(),
            info_id: None,
        }
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Get the size of a page (1-indexed)
    pub fn page_size(&self, page: usize) -> Result<PageSize> {
        self.check_page(page)?;
        Ok(self.page_sizes[page - 1])
    }

    fn check_page(&self, page: usize) -> Result<()> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }
        Ok(())
    }

    fn page_id(&self, page: usize) -> Result<ObjectId> {
        self.check_page(page)?;
        Ok(self.page_ids[page - 1])
    }

    /// Append a blank page
    ///
    /// # Returns
    /// New page number (1-indexed)
    pub fn add_page(&mut self, size: PageSize) -> Result<usize> {
        let page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(size.width as f32),
                Object::Real(size.height as f32),
            ],
            "Resources" => Dictionary::new(),
        };
        let new_page_id = self.inner.add_object(page_dict);

        let pages_dict = self
            .inner
            .get_object(self.pages_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Pages object is not a dictionary".to_string()))?;
        let mut kids_array = pages_dict
            .get(b"Kids")
            .and_then(Object::as_array)
            .map_err(|_| PdfError::ParseError("Pages object missing Kids array".to_string()))?
            .clone();
        kids_array.push(Object::Reference(new_page_id));

        let mut new_pages_dict = pages_dict.clone();
        new_pages_dict.set("Count", Object::Integer(kids_array.len() as i64));
        new_pages_dict.set("Kids", Object::Array(kids_array));
        self.inner.objects.insert(self.pages_id, new_pages_dict.into());

        self.page_ids.push(new_page_id);
        self.page_sizes.push(size);

        Ok(self.page_count())
    }

    /// Register a font family under a name used by `set_font`
    ///
    /// # Example
    /// ```ignore
    /// doc.register_font_family(
    ///     "roboto",
    ///     FontFamilyBuilder::new()
    ///         .regular(std::fs::read("Roboto-Regular.ttf")?)
    ///         .bold(std::fs::read("Roboto-Bold.ttf")?)
    ///         .build("roboto")?,
    /// )?;
    /// ```
    pub fn register_font_family(&mut self, name: &str, family: FontFamily) -> Result<()> {
        if self.font_families.contains_key(name) {
            return Err(PdfError::FontAlreadyExists(name.to_string()));
        }
        self.font_families.insert(name.to_string(), family);
        Ok(())
    }

    /// Set the current font family and size
    pub fn set_font(&mut self, family: &str, size: f32) -> Result<()> {
        if !self.font_families.contains_key(family) {
            return Err(PdfError::FontNotFound(family.to_string()));
        }

        self.current_family = Some(family.to_string());
        self.current_font_size = size;

        Ok(())
    }

    /// Set the font weight (keeps current family/size)
    pub fn set_font_weight(&mut self, weight: FontWeight) -> Result<()> {
        if self.current_family.is_none() {
            return Err(PdfError::FontNotFound("No font family set".to_string()));
        }

        self.current_weight = weight;
        Ok(())
    }

    /// Set the text color
    pub fn set_text_color(&mut self, color: Color) {
        self.current_text_color = color;
    }

    fn family(&self, name: &str) -> Result<&FontFamily> {
        self.font_families
            .get(name)
            .ok_or_else(|| PdfError::FontNotFound(name.to_string()))
    }

    /// Face selected by the current family and weight
    fn current_face(&self) -> Result<&FontFace> {
        let family_name = self
            .current_family
            .as_ref()
            .ok_or_else(|| PdfError::FontNotFound("No font family set".to_string()))?;
        Ok(self.family(family_name)?.variant(self.current_weight))
    }

    /// Find a registered face by its unique name
    fn face_by_name(&self, name: &str) -> Result<&FontFace> {
        self.font_families
            .values()
            .flat_map(FontFamily::faces)
            .find(|face| face.name() == name)
            .ok_or_else(|| PdfError::FontNotFound(name.to_string()))
    }

    /// Width of `text` in any registered family without touching the current font
    pub fn measure_text(
        &self,
        family: &str,
        weight: FontWeight,
        size: f32,
        text: &str,
    ) -> Result<f64> {
        let face = self.family(family)?.variant(weight);
        Ok(face.text_width_points(text, size) as f64)
    }

    /// Vertical metrics of a registered family at a size
    pub fn line_metrics(&self, family: &str, weight: FontWeight, size: f32) -> Result<LineMetrics> {
        Ok(self.family(family)?.variant(weight).line_metrics(size))
    }

    /// Insert text at a specific position
    ///
    /// # Arguments
    /// * `text` - Text to insert (single line)
    /// * `page` - Page number (1-indexed)
    /// * `x` - Anchor X coordinate in points; meaning depends on `align`
    /// * `y` - Baseline Y coordinate in points (from top)
    /// * `align` - Text alignment relative to `x`
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        align: Align,
    ) -> Result<()> {
        self.check_page(page)?;

        if text.is_empty() {
            return Ok(());
        }

        let face = self.current_face()?.clone();
        let text_width = face.text_width_points(text, self.current_font_size) as f64;
        let pdf_y = self.page_size(page)?.height - y;
        let start_x = x + align.offset(text_width);

        self.used_chars
            .entry(face.name().to_string())
            .or_default()
            .extend(text.chars());

        let ctx = TextRenderContext {
            font_name: self.get_or_create_font_ref(face.name(), page),
            font_size: self.current_font_size,
            color: self.current_text_color,
        };
        let operators = generate_text_operators(&face.encode_text_hex(text), start_x, pdf_y, &ctx);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Fill a rectangle whose top-left corner is at `(x, y)`
    pub fn fill_rect(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    ) -> Result<()> {
        let pdf_y = self.page_size(page)?.height - y - height;
        self.buffer_content(page, &fill_rect_operators(x, pdf_y, width, height, color));
        Ok(())
    }

    /// Stroke a rectangle outline whose top-left corner is at `(x, y)`
    #[allow(clippy::too_many_arguments)]
    pub fn stroke_rect(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
        line_width: f64,
    ) -> Result<()> {
        let pdf_y = self.page_size(page)?.height - y - height;
        let operators = stroke_rect_operators(x, pdf_y, width, height, color, line_width);
        self.buffer_content(page, &operators);
        Ok(())
    }

    /// Draw a straight line between two points
    pub fn draw_line(
        &mut self,
        page: usize,
        from: (f64, f64),
        to: (f64, f64),
        color: Color,
        line_width: f64,
    ) -> Result<()> {
        let height = self.page_size(page)?.height;
        let operators = line_operators(
            (from.0, height - from.1),
            (to.0, height - to.1),
            color,
            line_width,
        );
        self.buffer_content(page, &operators);
        Ok(())
    }

    /// Fill a circle centered at `(cx, cy)`
    pub fn fill_circle(
        &mut self,
        page: usize,
        cx: f64,
        cy: f64,
        radius: f64,
        color: Color,
    ) -> Result<()> {
        let pdf_cy = self.page_size(page)?.height - cy;
        self.buffer_content(page, &circle_operators(cx, pdf_cy, radius, color));
        Ok(())
    }

    /// Fill a rectangle with a left-to-right gradient between two colors
    #[allow(clippy::too_many_arguments)]
    pub fn fill_linear_gradient(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        from: Color,
        to: Color,
    ) -> Result<()> {
        let pdf_y = self.page_size(page)?.height - y - height;

        let shading_id = self
            .inner
            .add_object(axial_shading(x, pdf_y, x + width, from, to));
        let resource_name = format!("Sh{}", self.next_shading_resource);
        self.next_shading_resource += 1;
        self.add_page_resource(page, "Shading", &resource_name, shading_id)?;

        let operators = shading_operators(&resource_name, x, pdf_y, width, height);
        self.buffer_content(page, &operators);
        Ok(())
    }

    /// Insert an image with scaling mode
    ///
    /// # Arguments
    /// * `data` - Image file bytes (JPEG or PNG)
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Y coordinate of the image top in points (from top)
    /// * `width` - Target width in points
    /// * `height` - Target height in points
    /// * `mode` - Scaling mode
    ///
    /// # Returns
    /// The drawn (width, height) in points
    #[allow(clippy::too_many_arguments)]
    pub fn insert_image_scaled(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        mode: ImageScaleMode,
    ) -> Result<(f64, f64)> {
        self.check_page(page)?;

        let (image_resource_name, orig_width, orig_height) =
            self.get_or_create_image_ref(data, page)?;

        let (actual_width, actual_height) =
            calculate_scaled_dimensions(orig_width, orig_height, width, height, mode);

        let pdf_y = self.page_size(page)?.height - y - actual_height;
        let operators =
            generate_image_operators(&image_resource_name, x, pdf_y, actual_width, actual_height);
        self.buffer_content(page, &operators);

        Ok((actual_width, actual_height))
    }

    /// Set an entry of the document information dictionary (Title, Producer, ...)
    pub fn set_info(&mut self, key: &str, value: &str) {
        self.info.set(key, text_string(value));
    }

    /// Save the document to a file
    ///
    /// The destination is locked exclusively while writing and synced to
    /// disk before returning. A destination held by another process yields
    /// [`PdfError::OutputLocked`].
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        write_locked(path.as_ref(), &bytes)
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.flush_content_buffers()?;
        self.embed_fonts()?;
        self.write_info();

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        Ok(buffer)
    }

    fn write_info(&mut self) {
        if self.info.is_empty() {
            return;
        }
        let info = Object::Dictionary(self.info.clone());
        let info_id = match self.info_id {
            Some(id) => {
                self.inner.objects.insert(id, info);
                id
            }
            None => self.inner.add_object(info),
        };
        self.info_id = Some(info_id);
        self.inner.trailer.set("Info", info_id);
    }

    /// Embed every used face and point page resources at the new objects
    ///
    /// Fonts embedded by an earlier save are replaced so their widths and
    /// ToUnicode maps cover text added since.
    fn embed_fonts(&mut self) -> Result<()> {
        for (_, embedded) in self.embedded_fonts.drain() {
            for id in embedded.object_ids {
                self.inner.objects.remove(&id);
            }
        }

        let mut font_names: Vec<String> = self.used_chars.keys().cloned().collect();
        font_names.sort();

        for font_name in font_names {
            let embedded = self.embed_font_object(&font_name)?;
            self.embedded_fonts.insert(font_name, embedded);
        }

        self.finalize_page_font_resources()
    }

    /// Embed a single face into the PDF
    fn embed_font_object(&mut self, font_name: &str) -> Result<EmbeddedFont> {
        let face = self.face_by_name(font_name)?.clone();

        let data = match face {
            FontFace::Builtin(font) => {
                let font_id = self.inner.add_object(font.to_pdf_dictionary());
                return Ok(EmbeddedFont {
                    font_id,
                    object_ids: vec![font_id],
                });
            }
            FontFace::TrueType(data) => data,
        };

        let used = self.used_chars.get(font_name).cloned().unwrap_or_default();
        let font_objects = data.to_pdf_objects(&used)?;

        let font_file_id = self.inner.add_object(font_objects.font_file_stream);

        let mut font_descriptor = font_objects.font_descriptor;
        font_descriptor.set("FontFile2", Object::Reference(font_file_id));
        let font_descriptor_id = self.inner.add_object(font_descriptor);

        let mut cid_font = font_objects.cid_font;
        cid_font.set("FontDescriptor", Object::Reference(font_descriptor_id));
        let cid_font_id = self.inner.add_object(cid_font);

        let tounicode_id = self.inner.add_object(font_objects.tounicode_stream);

        let mut type0_font = font_objects.type0_font;
        type0_font.set(
            "DescendantFonts",
            Object::Array(vec![Object::Reference(cid_font_id)]),
        );
        type0_font.set("ToUnicode", Object::Reference(tounicode_id));
        let type0_font_id = self.inner.add_object(type0_font);

        Ok(EmbeddedFont {
            font_id: type0_font_id,
            object_ids: vec![
                font_file_id,
                font_descriptor_id,
                cid_font_id,
                tounicode_id,
                type0_font_id,
            ],
        })
    }

    /// Get or create a font resource name for a face on a page
    ///
    /// Returns the resource name (e.g., "F1", "F2") for use in content
    /// streams. The font itself is embedded at save time.
    fn get_or_create_font_ref(&mut self, font_name: &str, page: usize) -> String {
        let page_resources = self.page_font_resources.entry(page).or_default();

        if let Some(resource_name) = page_resources.get(font_name) {
            return resource_name.clone();
        }

        let resource_name = format!("F{}", self.next_font_resource);
        self.next_font_resource += 1;
        page_resources.insert(font_name.to_string(), resource_name.clone());

        resource_name
    }

    /// Add font references to page resources after fonts are embedded
    fn finalize_page_font_resources(&mut self) -> Result<()> {
        let mut entries = Vec::new();
        for (&page, fonts) in &self.page_font_resources {
            for (font_name, resource_name) in fonts {
                let embedded = self
                    .embedded_fonts
                    .get(font_name)
                    .ok_or_else(|| PdfError::FontNotFound(font_name.clone()))?;
                entries.push((page, resource_name.clone(), embedded.font_id));
            }
        }

        for (page, resource_name, font_id) in entries {
            self.add_page_resource(page, "Font", &resource_name, font_id)?;
        }

        Ok(())
    }

    /// Register an object under `/Resources/<category>/<name>` of a page
    fn add_page_resource(
        &mut self,
        page: usize,
        category: &str,
        name: &str,
        object_id: ObjectId,
    ) -> Result<()> {
        let page_id = self.page_id(page)?;

        let page_dict = self
            .inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::SaveError("Page object is not a dictionary".to_string()))?;

        let mut resources_dict = page_dict
            .get(b"Resources")
            .and_then(Object::as_dict)
            .cloned()
            .unwrap_or_default();

        let mut category_dict = resources_dict
            .get(category.as_bytes())
            .and_then(Object::as_dict)
            .cloned()
            .unwrap_or_default();
        category_dict.set(name, Object::Reference(object_id));
        resources_dict.set(category, Object::Dictionary(category_dict));

        let mut new_page_dict = page_dict.clone();
        new_page_dict.set("Resources", Object::Dictionary(resources_dict));
        self.inner.objects.insert(page_id, new_page_dict.into());

        Ok(())
    }

    /// Get a reference to the underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    /// Buffer content operators for a page (written at save time)
    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    /// Flush all buffered content to page streams
    fn flush_content_buffers(&mut self) -> Result<()> {
        let mut buffers: Vec<(usize, Vec<u8>)> = self.page_content_buffer.drain().collect();
        buffers.sort_by_key(|(page, _)| *page);

        for (page, content) in buffers {
            if !content.is_empty() {
                self.append_to_content_stream(page, content)?;
            }
        }

        Ok(())
    }

    /// Append content to a page's content stream, creating it on first use
    fn append_to_content_stream(&mut self, page: usize, content: Vec<u8>) -> Result<()> {
        let page_id = self.page_id(page)?;

        let existing_stream_id = self
            .inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?
            .get(b"Contents")
            .and_then(Object::as_reference)
            .ok();

        if let Some(stream_id) = existing_stream_id {
            if let Ok(Object::Stream(stream)) = self.inner.get_object_mut(stream_id) {
                let mut combined = stream.content.clone();
                combined.extend_from_slice(&content);
                stream.set_content(combined);
                return Ok(());
            }
        }

        let stream_id = self.inner.add_object(Stream::new(Dictionary::new(), content));

        let mut new_page_dict = self
            .inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?
            .clone();
        new_page_dict.set("Contents", Object::Reference(stream_id));
        self.inner.objects.insert(page_id, new_page_dict.into());

        Ok(())
    }

    /// Get or create an image reference for a specific page
    ///
    /// Returns the resource name (e.g., "Im1") and pixel dimensions.
    /// Images are deduplicated by a hash of their data.
    fn get_or_create_image_ref(&mut self, data: &[u8], page: usize) -> Result<(String, u32, u32)> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let data_hash = hasher.finish();

        let (object_id, width, height) = match self.embedded_images.get(&data_hash) {
            Some(&entry) => entry,
            None => {
                let xobject = ImageXObject::from_bytes(data)?;
                let object_id = self.inner.add_object(xobject.to_pdf_stream());
                let entry = (object_id, xobject.width, xobject.height);
                self.embedded_images.insert(data_hash, entry);
                entry
            }
        };

        if let Some(name) = self
            .page_image_resources
            .get(&page)
            .and_then(|resources| resources.get(&object_id))
        {
            return Ok((name.clone(), width, height));
        }

        let resource_name = format!("Im{}", self.next_image_resource);
        self.next_image_resource += 1;
        self.page_image_resources
            .entry(page)
            .or_default()
            .insert(object_id, resource_name.clone());
        self.add_page_resource(page, "XObject", &resource_name, object_id)?;

        Ok((resource_name, width, height))
    }
}

/// Encode a PDF text string: literal when ASCII, UTF-16BE with BOM otherwise
fn text_string(value: &str) -> Object {
    if value.is_ascii() {
        return Object::string_literal(value);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::BuiltinFont;
    use pretty_assertions::assert_eq;

    fn doc_with_helvetica() -> PdfDocument {
        let mut doc = PdfDocument::new();
        doc.register_font_family(
            "helvetica",
            FontFamily::builtin(BuiltinFont::Helvetica, BuiltinFont::HelveticaBold),
        )
        .unwrap();
        doc
    }

    fn page_content(doc: &PdfDocument, page: usize) -> String {
        let page_id = doc.page_ids[page - 1];
        let bytes = doc.inner.get_page_content(page_id).unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn test_color_hex_round_trip() {
        let brand = Color::from_hex("#F37021").unwrap();
        assert_eq!(brand, Color::from_rgb(0xF3, 0x70, 0x21));
        assert_eq!(brand.to_hex(), "#F37021");
        assert_eq!(Color::from_hex("fdb813").unwrap().to_hex(), "#FDB813");
    }

    #[test]
    fn test_color_hex_rejects_malformed() {
        assert_eq!(Color::from_hex("#FFF"), None);
        assert_eq!(Color::from_hex("#GG0000"), None);
        assert_eq!(Color::from_hex("#ÀÀÀ"), None);
    }

    #[test]
    fn test_new_document_has_no_pages() {
        let doc = PdfDocument::new();
        assert_eq!(doc.page_count(), 0);
        assert!(matches!(doc.page_size(1), Err(PdfError::InvalidPage(1, 0))));
    }

    #[test]
    fn test_add_page_updates_tree() {
        let mut doc = PdfDocument::new();
        assert_eq!(doc.add_page(PageSize::A4).unwrap(), 1);
        assert_eq!(doc.add_page(PageSize::new(300.0, 400.0)).unwrap(), 2);

        assert_eq!(doc.inner().get_pages().len(), 2);
        assert_eq!(doc.page_size(2).unwrap(), PageSize::new(300.0, 400.0));

        let pages = doc.inner().get_object(doc.pages_id).unwrap().as_dict().unwrap();
        assert_eq!(pages.get(b"Count").unwrap().as_i64().unwrap(), 2);
    }

    #[test]
    fn test_register_font_family_twice() {
        let mut doc = doc_with_helvetica();
        let result = doc.register_font_family(
            "helvetica",
            FontFamily::builtin(BuiltinFont::Helvetica, BuiltinFont::HelveticaBold),
        );
        assert!(matches!(result, Err(PdfError::FontAlreadyExists(_))));
    }

    #[test]
    fn test_set_font_unknown_family() {
        let mut doc = PdfDocument::new();
        assert!(matches!(
            doc.set_font("roboto", 10.0),
            Err(PdfError::FontNotFound(_))
        ));
        assert!(doc.set_font_weight(FontWeight::Bold).is_err());
    }

    #[test]
    fn test_insert_text_requires_valid_page() {
        let mut doc = doc_with_helvetica();
        doc.set_font("helvetica", 10.0).unwrap();
        let result = doc.insert_text("Olá", 1, 40.0, 40.0, Align::Left);
        assert!(matches!(result, Err(PdfError::InvalidPage(1, 0))));
    }

    #[test]
    fn test_insert_text_right_aligned() {
        let mut doc = doc_with_helvetica();
        let page = doc.add_page(PageSize::A4).unwrap();
        doc.set_font("helvetica", 10.0).unwrap();
        // "R$" is 12.78pt wide at 10pt
        doc.insert_text("R$", page, 100.0, 41.89, Align::Right).unwrap();
        doc.to_bytes().unwrap();

        let content = page_content(&doc, page);
        assert!(content.contains("87.22 800 Td"));
        assert!(content.contains("<5224> Tj"));
    }

    #[test]
    fn test_font_resources_are_shared_per_page() {
        let mut doc = doc_with_helvetica();
        let page = doc.add_page(PageSize::A4).unwrap();
        doc.set_font("helvetica", 10.0).unwrap();
        doc.insert_text("a", page, 0.0, 10.0, Align::Left).unwrap();
        doc.insert_text("b", page, 0.0, 20.0, Align::Left).unwrap();
        doc.set_font_weight(FontWeight::Bold).unwrap();
        doc.insert_text("c", page, 0.0, 30.0, Align::Left).unwrap();
        doc.to_bytes().unwrap();

        let page_dict = doc.inner().get_object(doc.page_ids[0]).unwrap().as_dict().unwrap();
        let fonts = page_dict
            .get(b"Resources")
            .unwrap()
            .as_dict()
            .unwrap()
            .get(b"Font")
            .unwrap()
            .as_dict()
            .unwrap();
        assert_eq!(fonts.len(), 2);
    }

    #[test]
    fn test_saving_twice_does_not_duplicate_fonts() {
        let mut doc = doc_with_helvetica();
        let page = doc.add_page(PageSize::A4).unwrap();
        doc.set_font("helvetica", 10.0).unwrap();
        doc.insert_text("Página 1", page, 40.0, 40.0, Align::Left).unwrap();

        let first = doc.to_bytes().unwrap();
        let second = doc.to_bytes().unwrap();
        let count_fonts = |bytes: &[u8]| {
            let loaded = Document::load_mem(bytes).unwrap();
            loaded
                .objects
                .values()
                .filter(|o| {
                    o.as_dict()
                        .ok()
                        .and_then(|d| d.get(b"Type").ok())
                        .and_then(|t| t.as_name().ok())
                        == Some(b"Font".as_slice())
                })
                .count()
        };
        assert_eq!(count_fonts(&first), 1);
        assert_eq!(count_fonts(&second), 1);
    }

    #[test]
    fn test_fill_rect_converts_to_bottom_origin() {
        let mut doc = PdfDocument::new();
        let page = doc.add_page(PageSize::new(200.0, 100.0)).unwrap();
        doc.fill_rect(page, 10.0, 20.0, 50.0, 30.0, Color::black()).unwrap();
        doc.to_bytes().unwrap();

        assert!(page_content(&doc, page).contains("10 50 50 30 re"));
    }

    #[test]
    fn test_draw_line_and_circle() {
        let mut doc = PdfDocument::new();
        let page = doc.add_page(PageSize::new(200.0, 100.0)).unwrap();
        doc.draw_line(page, (0.0, 10.0), (200.0, 10.0), Color::black(), 1.0)
            .unwrap();
        doc.fill_circle(page, 50.0, 50.0, 2.0, Color::black()).unwrap();
        doc.to_bytes().unwrap();

        let content = page_content(&doc, page);
        assert!(content.contains("0 90 m\n200 90 l"));
        assert!(content.contains("52 50 m"));
    }

    #[test]
    fn test_gradient_registers_shading_resource() {
        let mut doc = PdfDocument::new();
        let page = doc.add_page(PageSize::A4).unwrap();
        doc.fill_linear_gradient(
            page,
            40.0,
            90.0,
            515.28,
            3.0,
            Color::from_rgb(0xF3, 0x70, 0x21),
            Color::from_rgb(0xFD, 0xB8, 0x13),
        )
        .unwrap();
        doc.to_bytes().unwrap();

        let page_dict = doc.inner().get_object(doc.page_ids[0]).unwrap().as_dict().unwrap();
        let shading = page_dict
            .get(b"Resources")
            .unwrap()
            .as_dict()
            .unwrap()
            .get(b"Shading")
            .unwrap()
            .as_dict()
            .unwrap();
        assert!(shading.has(b"Sh1"));
        assert!(page_content(&doc, page).contains("/Sh1 sh"));
    }

    #[test]
    fn test_content_is_appended_across_saves() {
        let mut doc = PdfDocument::new();
        let page = doc.add_page(PageSize::A4).unwrap();
        doc.fill_rect(page, 0.0, 0.0, 1.0, 1.0, Color::black()).unwrap();
        doc.to_bytes().unwrap();
        doc.fill_rect(page, 5.0, 0.0, 1.0, 1.0, Color::white()).unwrap();
        doc.to_bytes().unwrap();

        let content = page_content(&doc, page);
        assert_eq!(content.matches(" re\n").count(), 2);
    }

    #[test]
    fn test_info_uses_utf16_for_non_ascii() {
        let mut doc = PdfDocument::new();
        doc.add_page(PageSize::A4).unwrap();
        doc.set_info("Title", "Orçamento");
        doc.set_info("Producer", "orcamento");
        let bytes = doc.to_bytes().unwrap();

        let loaded = Document::load_mem(&bytes).unwrap();
        let info_id = loaded.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = loaded.get_object(info_id).unwrap().as_dict().unwrap();
        let title = info.get(b"Title").unwrap().as_str().unwrap();
        assert_eq!(&title[..2], &[0xFE, 0xFF]);
        assert_eq!(info.get(b"Producer").unwrap().as_str().unwrap(), b"orcamento");
    }
}
