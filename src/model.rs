use std::collections::{HashMap, HashSet};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// Output medium. Only `Prepress` targets duplex printing and activates page parity rules.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Media {
    #[default]
    Screen,
    Print,
    Prepress,
}

impl Media {
    /// Unknown values fall back to `Screen`.
    pub fn parse(val: &str) -> Self {
        match val.trim().to_ascii_lowercase().as_str() {
            "prepress" => Media::Prepress,
            "print" => Media::Print,
            _ => Media::Screen,
        }
    }

    pub fn is_duplex(self) -> bool {
        matches!(self, Media::Prepress)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }
}

/// Concatenated text of a run list, formatting dropped.
pub fn plain_text(runs: &[Run]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

#[derive(Clone, Debug, Default)]
pub struct Paragraph {
    pub runs: Vec<Run>,
}

/// Handle into the document's section arena. Only valid for the document that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(usize);

pub struct Section {
    pub id: String,
    pub role: String,
    pub level: u8, // 1 = top level (chapter-like unit)
    pub parent: Option<SectionId>,
    pub children: Vec<SectionId>,
    pub title: Vec<Run>,
    pub paragraphs: Vec<Paragraph>,
    pub options: HashSet<String>,
    pub detached: bool,
}

impl Section {
    pub fn has_option(&self, name: &str) -> bool {
        self.options.contains(name)
    }

    /// Exempt from the recto-start rule in duplex mode.
    pub fn is_nonfacing(&self) -> bool {
        self.has_option("nonfacing")
    }

    pub fn title_text(&self) -> String {
        plain_text(&self.title)
    }
}

pub struct Document {
    pub title: String,
    pub author: Option<String>,
    pub media: Media,
    pub attributes: HashMap<String, String>,
    pub toc: bool,
    pub toc_levels: u8,
    sections: Vec<Section>,
    roots: Vec<SectionId>,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: None,
            media: Media::default(),
            attributes: HashMap::new(),
            toc: true,
            toc_levels: 2,
            sections: Vec::new(),
            roots: Vec::new(),
        }
    }

    pub fn is_duplex(&self) -> bool {
        self.media.is_duplex()
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Append a section to `parent` (or to the document root when `None`).
    pub fn add_section(
        &mut self,
        parent: Option<SectionId>,
        id: impl Into<String>,
        role: impl Into<String>,
        title: Vec<Run>,
    ) -> SectionId {
        let handle = SectionId(self.sections.len());
        let level = parent
            .map(|p| self.sections[p.0].level.saturating_add(1))
            .unwrap_or(1);
        self.sections.push(Section {
            id: id.into(),
            role: role.into(),
            level,
            parent,
            children: Vec::new(),
            title,
            paragraphs: Vec::new(),
            options: HashSet::new(),
            detached: false,
        });
        match parent {
            Some(p) => self.sections[p.0].children.push(handle),
            None => self.roots.push(handle),
        }
        handle
    }

    pub fn section(&self, id: SectionId) -> &Section {
        &self.sections[id.0]
    }

    pub fn section_mut(&mut self, id: SectionId) -> &mut Section {
        &mut self.sections[id.0]
    }

    /// Attached children of `parent`, or the top-level sections when `None`.
    pub fn children(&self, parent: Option<SectionId>) -> &[SectionId] {
        match parent {
            Some(p) => &self.sections[p.0].children,
            None => &self.roots,
        }
    }

    /// Attached sections in document order (pre-order).
    pub fn walk(&self) -> Vec<SectionId> {
        let mut out = Vec::with_capacity(self.sections.len());
        let mut stack: Vec<SectionId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.sections[id.0].children.iter().rev().copied());
        }
        out
    }

    pub fn find_by_role(&self, role: &str) -> Vec<SectionId> {
        self.walk()
            .into_iter()
            .filter(|&id| self.sections[id.0].role == role)
            .collect()
    }

    pub fn find_first_by_role(&self, role: &str) -> Option<SectionId> {
        self.walk()
            .into_iter()
            .find(|&id| self.sections[id.0].role == role)
    }

    pub fn find_by_id(&self, id: &str) -> Option<SectionId> {
        self.walk()
            .into_iter()
            .find(|&handle| self.sections[handle.0].id == id)
    }

    /// Remove a section from its parent's child list. The node stays in the arena and
    /// remains addressable through its handle. Returns false if it was already detached.
    pub fn detach(&mut self, id: SectionId) -> bool {
        if self.sections[id.0].detached {
            return false;
        }
        let siblings = match self.sections[id.0].parent {
            Some(p) => &mut self.sections[p.0].children,
            None => &mut self.roots,
        };
        siblings.retain(|&c| c != id);
        self.sections[id.0].detached = true;
        true
    }
}
