use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::OnceLock;

use memmap2::Mmap;
use pdf_writer::{Name, Pdf, Rect, Ref, Str};
use ttf_parser::Face;

use crate::surface::Typeface;

/// The faces a book can reference. Body text uses the base-14 Helvetica family; headings
/// with the display typeface use a system font when one is installed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum FaceKey {
    Regular,
    Bold,
    Italic,
    BoldItalic,
    Display,
}

impl FaceKey {
    pub(crate) const ALL: [FaceKey; 5] = [
        FaceKey::Regular,
        FaceKey::Bold,
        FaceKey::Italic,
        FaceKey::BoldItalic,
        FaceKey::Display,
    ];

    pub(crate) fn select(typeface: Typeface, bold: bool, italic: bool) -> Self {
        match (typeface, bold, italic) {
            (Typeface::Display, _, _) => FaceKey::Display,
            (Typeface::Base, true, true) => FaceKey::BoldItalic,
            (Typeface::Base, true, false) => FaceKey::Bold,
            (Typeface::Base, false, true) => FaceKey::Italic,
            (Typeface::Base, false, false) => FaceKey::Regular,
        }
    }

    pub(crate) fn pdf_name(self) -> &'static str {
        match self {
            FaceKey::Regular => "F1",
            FaceKey::Bold => "F2",
            FaceKey::Italic => "F3",
            FaceKey::BoldItalic => "F4",
            FaceKey::Display => "F5",
        }
    }

    fn standard_name(self) -> &'static str {
        match self {
            FaceKey::Bold => "Helvetica-Bold",
            FaceKey::Italic => "Helvetica-Oblique",
            FaceKey::BoldItalic => "Helvetica-BoldOblique",
            FaceKey::Regular | FaceKey::Display => "Helvetica",
        }
    }
}

enum FaceSource {
    Standard(&'static str),
    TrueType {
        family: String,
        data: Vec<u8>,
        face_index: u32,
    },
}

pub(crate) struct LoadedFace {
    source: FaceSource,
    widths_1000: Vec<f32>, // WinAnsi 32..=255
    pub(crate) ascender_ratio: f32,
}

impl LoadedFace {
    fn standard(key: FaceKey) -> Self {
        Self {
            source: FaceSource::Standard(key.standard_name()),
            widths_1000: helvetica_widths(),
            ascender_ratio: 0.75,
        }
    }

    fn truetype(family: &str, data: Vec<u8>, face_index: u32) -> Option<Self> {
        let face = Face::parse(&data, face_index).ok()?;
        let units = face.units_per_em() as f32;
        let widths_1000 = (32u8..=255u8)
            .map(|byte| {
                face.glyph_index(winansi_to_char(byte))
                    .and_then(|gid| face.glyph_hor_advance(gid))
                    .map(|adv| adv as f32 / units * 1000.0)
                    .unwrap_or(0.0)
            })
            .collect();
        let ascender_ratio = face.ascender() as f32 / units;
        Some(Self {
            source: FaceSource::TrueType {
                family: family.to_string(),
                data,
                face_index,
            },
            widths_1000,
            ascender_ratio,
        })
    }

    fn char_width_1000(&self, ch: char) -> f32 {
        let byte = char_to_winansi(ch);
        if byte >= 32 {
            self.widths_1000[(byte - 32) as usize]
        } else {
            // outside WinAnsi: average glyph
            556.0
        }
    }

    pub(crate) fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars()
            .map(|ch| self.char_width_1000(ch) * font_size / 1000.0)
            .sum()
    }
}

pub(crate) struct FontSet {
    faces: HashMap<FaceKey, LoadedFace>,
}

impl FontSet {
    /// Helvetica for every face, no system lookup.
    pub(crate) fn standard() -> Self {
        let faces = FaceKey::ALL
            .into_iter()
            .map(|key| (key, LoadedFace::standard(key)))
            .collect();
        Self { faces }
    }

    /// Resolve the display family from installed fonts, Helvetica if it isn't found.
    pub(crate) fn load(display_family: &str) -> Self {
        let mut set = Self::standard();
        let family = display_family.trim();
        if family.is_empty() || family.eq_ignore_ascii_case("helvetica") {
            return set;
        }
        let display = find_font_file(family).and_then(|(path, face_index)| {
            let data = std::fs::read(&path).ok()?;
            LoadedFace::truetype(family, data, face_index)
        });
        match display {
            Some(face) => {
                log::debug!("display typeface: {family}");
                set.faces.insert(FaceKey::Display, face);
            }
            None => log::warn!("Font not found: {family} — using Helvetica for display headings"),
        }
        set
    }

    pub(crate) fn face(&self, key: FaceKey) -> &LoadedFace {
        &self.faces[&key]
    }
}

/// Lowercase family name -> (file path, face index within TTC). Regular faces win over
/// bold/italic ones of the same family.
type FontLookup = HashMap<String, (PathBuf, u32)>;

static FONT_INDEX: OnceLock<FontLookup> = OnceLock::new();

fn font_family_name(face: &Face) -> Option<String> {
    face.names()
        .into_iter()
        .filter(|name| name.name_id == ttf_parser::name_id::FAMILY && name.is_unicode())
        .find_map(|name| name.to_string())
}

fn font_directories() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    if let Ok(val) = std::env::var("BOOKPRESS_FONTS") {
        let sep = if cfg!(windows) { ';' } else { ':' };
        dirs.extend(
            val.split(sep)
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(PathBuf::from),
        );
    }

    #[cfg(target_os = "macos")]
    {
        dirs.extend([
            "/Library/Fonts".into(),
            "/System/Library/Fonts".into(),
            "/System/Library/Fonts/Supplemental".into(),
        ]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join("Library/Fonts"));
        }
    }

    #[cfg(target_os = "linux")]
    {
        dirs.extend(["/usr/share/fonts".into(), "/usr/local/share/fonts".into()]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join(".local/share/fonts"));
        }
    }

    #[cfg(target_os = "windows")]
    {
        match std::env::var("WINDIR") {
            Ok(windir) => dirs.push(PathBuf::from(windir).join("Fonts")),
            Err(_) => dirs.push("C:\\Windows\\Fonts".into()),
        }
    }

    dirs
}

fn is_font_file(path: &std::path::Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("ttf" | "otf" | "ttc")
    )
}

fn scan_font_dirs() -> FontLookup {
    let t0 = std::time::Instant::now();
    let mut index = FontLookup::new();
    let mut files_scanned = 0u32;
    let mut visited: HashSet<PathBuf> = HashSet::new();

    let mut stack = font_directories();
    while let Some(dir) = stack.pop() {
        if !visited.insert(dir.clone()) {
            continue;
        }
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if !is_font_file(&path) {
                continue;
            }
            files_scanned += 1;
            let Ok(file) = std::fs::File::open(&path) else {
                continue;
            };
            // SAFETY: font files are only read; a concurrent writer could at worst make
            // ttf-parser reject the face.
            let Ok(data) = (unsafe { Mmap::map(&file) }) else {
                continue;
            };
            let face_count = ttf_parser::fonts_in_collection(&data).unwrap_or(1);
            for face_index in 0..face_count {
                let Ok(face) = Face::parse(&data, face_index) else {
                    continue;
                };
                let Some(family) = font_family_name(&face) else {
                    continue;
                };
                let regular = !face.is_bold() && !face.is_italic();
                let key = family.to_lowercase();
                if regular {
                    index.insert(key, (path.clone(), face_index));
                } else {
                    index.entry(key).or_insert((path.clone(), face_index));
                }
            }
        }
    }

    log::info!(
        "Font scan: {:.1}ms, {} files parsed → {} families",
        t0.elapsed().as_secs_f64() * 1000.0,
        files_scanned,
        index.len(),
    );
    index
}

fn find_font_file(family: &str) -> Option<(PathBuf, u32)> {
    FONT_INDEX
        .get_or_init(scan_font_dirs)
        .get(&family.to_lowercase())
        .cloned()
}

fn winansi_to_char(byte: u8) -> char {
    match byte {
        0x80 => '\u{20AC}',
        0x85 => '\u{2026}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}',
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        0x99 => '\u{2122}',
        _ => byte as char,
    }
}

/// Map a char to its WinAnsi byte, 0 if it has none.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007F | 0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x2026 => 0x85,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x2122 => 0x99,
        _ => 0,
    }
}

/// Approximate Helvetica widths at 1000 units/em for WinAnsi chars 32..=255.
fn helvetica_widths() -> Vec<f32> {
    (32u8..=255u8)
        .map(|b| match b {
            32 => 278.0,                          // space
            33..=47 => 333.0,                     // punctuation
            48..=57 => 556.0,                     // digits
            58..=64 => 333.0,                     // more punctuation
            73 | 74 => 278.0,                     // I J
            77 => 833.0,                          // M
            65..=90 => 667.0,                     // uppercase average
            91..=96 => 333.0,                     // brackets etc.
            102 | 105 | 106 | 108 | 116 => 278.0, // f i j l t
            109 | 119 => 833.0,                   // m w
            97..=122 => 556.0,                    // lowercase average
            _ => 556.0,
        })
        .collect()
}

/// A face written into the PDF, with the encoding its content-stream strings need.
pub(crate) struct RegisteredFont {
    pub(crate) font_ref: Ref,
    char_to_gid: Option<HashMap<char, u16>>,
}

impl RegisteredFont {
    pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
        match &self.char_to_gid {
            Some(map) => text
                .chars()
                .flat_map(|ch| map.get(&ch).copied().unwrap_or(0).to_be_bytes())
                .collect(),
            None => text
                .chars()
                .map(char_to_winansi)
                .filter(|&b| b != 0)
                .collect(),
        }
    }
}

pub(crate) fn register_face(
    pdf: &mut Pdf,
    face: &LoadedFace,
    used_chars: &HashSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> RegisteredFont {
    let font_ref = alloc();
    if let FaceSource::TrueType {
        family,
        data,
        face_index,
    } = &face.source
    {
        if let Some(char_to_gid) =
            embed_truetype(pdf, font_ref, family, data, *face_index, used_chars, alloc)
        {
            return RegisteredFont {
                font_ref,
                char_to_gid: Some(char_to_gid),
            };
        }
        log::warn!("Embedding {family} failed — using Helvetica");
    }
    let base_name = match &face.source {
        FaceSource::Standard(name) => *name,
        FaceSource::TrueType { .. } => "Helvetica",
    };
    pdf.type1_font(font_ref)
        .base_font(Name(base_name.as_bytes()))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    RegisteredFont {
        font_ref,
        char_to_gid: None,
    }
}

/// Embed a subsetted TrueType/OpenType face as a Type0 font with Identity-H encoding.
fn embed_truetype(
    pdf: &mut Pdf,
    font_ref: Ref,
    family: &str,
    data: &[u8],
    face_index: u32,
    used_chars: &HashSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> Option<HashMap<char, u16>> {
    let face = Face::parse(data, face_index).ok()?;
    let units = face.units_per_em() as f32;
    let scale = |v: f32| v / units * 1000.0;

    let bb = face.global_bounding_box();
    let bbox = Rect::new(
        scale(bb.x_min as f32),
        scale(bb.y_min as f32),
        scale(bb.x_max as f32),
        scale(bb.y_max as f32),
    );

    let mut remapper = subsetter::GlyphRemapper::new();
    let mut char_to_gid = HashMap::new();
    let mut gid_widths: Vec<(u16, f32)> = Vec::new();
    for &ch in used_chars {
        if let Some(gid) = face.glyph_index(ch) {
            let new_gid = remapper.remap(gid.0);
            char_to_gid.insert(ch, new_gid);
            let advance = face.glyph_hor_advance(gid).unwrap_or(0) as f32;
            gid_widths.push((new_gid, scale(advance)));
        }
    }
    gid_widths.sort_by_key(|&(gid, _)| gid);
    gid_widths.dedup_by_key(|&mut (gid, _)| gid);

    let subset = subsetter::subset(data, face_index, &remapper).unwrap_or_else(|e| {
        log::warn!("Font subsetting failed for {family}: {e} — embedding full font");
        data.to_vec()
    });

    let data_ref = alloc();
    let descriptor_ref = alloc();
    let cid_font_ref = alloc();
    let tounicode_ref = alloc();
    let ps_name = family.replace(' ', "");

    let data_len = i32::try_from(subset.len()).ok()?;
    pdf.stream(data_ref, &subset).pair(Name(b"Length1"), data_len);

    pdf.font_descriptor(descriptor_ref)
        .name(Name(ps_name.as_bytes()))
        .flags(pdf_writer::types::FontFlags::NON_SYMBOLIC)
        .bbox(bbox)
        .italic_angle(0.0)
        .ascent(scale(face.ascender() as f32))
        .descent(scale(face.descender() as f32))
        .cap_height(face.capital_height().map(|h| scale(h as f32)).unwrap_or(700.0))
        .stem_v(80.0)
        .font_file2(data_ref);

    let system_info = pdf_writer::types::SystemInfo {
        registry: Str(b"Adobe"),
        ordering: Str(b"Identity"),
        supplement: 0,
    };
    {
        let mut cid = pdf.cid_font(cid_font_ref);
        cid.subtype(pdf_writer::types::CidFontType::Type2);
        cid.base_font(Name(ps_name.as_bytes()));
        cid.system_info(system_info);
        cid.font_descriptor(descriptor_ref);
        cid.default_width(0.0);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        if !gid_widths.is_empty() {
            let mut widths = cid.widths();
            for &(gid, width) in &gid_widths {
                widths.consecutive(gid, [width]);
            }
        }
    }

    let cmap_name = format!("{ps_name}-UTF16");
    let mut cmap = pdf_writer::types::UnicodeCmap::new(
        Name(cmap_name.as_bytes()),
        pdf_writer::types::SystemInfo {
            registry: Str(b"Adobe"),
            ordering: Str(b"Identity"),
            supplement: 0,
        },
    );
    for (&ch, &gid) in &char_to_gid {
        cmap.pair(gid, ch);
    }
    let cmap_data = cmap.finish();
    pdf.stream(tounicode_ref, cmap_data.as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(ps_name.as_bytes()))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_ref)
        .to_unicode(tounicode_ref);

    Some(char_to_gid)
}
