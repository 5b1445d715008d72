//! The build steps of a parallel edition project.
//!
//! Each step reads the artifacts of the one before it from the build folder, so
//! the steps can be run one at a time or all together through [`Project::build`].

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use usfm_paracol_config::{Config, OutputFormat, Paths};
use usfm_paracol_engine::{
    DocumentMeta, Html, Latex, MappingColumns, Typesetter, alignment, assemble, build_rows, io,
    parse_document, render_verse, skeleton,
};

pub struct Project {
    pub config: Config,
    paths: Paths,
}

impl Project {
    pub fn new(config: Config, root: &Path) -> Self {
        let paths = config.paths.resolve(root);
        Self { config, paths }
    }

    /// Primary, secondary and skeleton labels without repeats.
    pub fn default_editions(&self) -> Vec<String> {
        let mut labels: Vec<String> = vec![];
        for label in [
            &self.config.primary.label,
            &self.config.secondary.label,
            &self.config.skeleton_edition,
        ] {
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }
        labels
    }

    pub fn format(&self, requested: Option<OutputFormat>) -> OutputFormat {
        requested.unwrap_or(self.config.document.format)
    }

    pub fn unpack(&self) -> Result<Vec<PathBuf>> {
        let written = io::unpack_sources(&self.paths.sources, &self.paths.usfm_dir())
            .with_context(|| format!("Failed to unpack {}", self.paths.sources.display()))?;
        log::info!("unpacked {} sources", written.len());
        Ok(written)
    }

    /// Encodes the configured book of one edition into its JSON verse map.
    pub fn parse(&self, label: &str) -> Result<PathBuf> {
        let book = &self.config.book;
        let edition_dir = io::find_edition_dir(&self.paths.usfm_dir(), label)?;
        let source_path = io::find_book_file(&edition_dir, book)?;
        let source = io::read_source(&source_path)?;

        let parsed = parse_document(&source);
        if let Some(id) = &parsed.book_id
            && !id.eq_ignore_ascii_case(book)
        {
            log::warn!("{} declares book {id}, expected {book}", source_path.display());
        }

        let out = self.paths.verses_json(label, book);
        io::write_verse_map(&out, &parsed.verses)?;
        log::info!(
            "encoded {} verses of {label} -> {}",
            parsed.verses.len(),
            out.display()
        );
        Ok(out)
    }

    /// Seeds the mapping table with the verse list of one encoded edition.
    pub fn skeleton(&self, label: &str, force: bool) -> Result<PathBuf> {
        let out = &self.paths.mapping;
        if out.exists() && !force {
            bail!(
                "{} already exists; pass --force to overwrite it",
                out.display()
            );
        }

        let verses = io::read_verse_map(&self.paths.verses_json(label, &self.config.book))?;
        let rows = skeleton(&verses);

        let mut buf = vec![];
        alignment::write_mapping(&mut buf, &self.mapping_columns(), &rows)?;
        io::write_file(out, &String::from_utf8_lossy(&buf))?;
        log::info!("wrote {} mapping rows -> {}", rows.len(), out.display());
        Ok(out.clone())
    }

    pub fn align(&self) -> Result<PathBuf> {
        let book = &self.config.book;
        let primary =
            io::read_verse_map(&self.paths.verses_json(&self.config.primary.label, book))?;
        let secondary =
            io::read_verse_map(&self.paths.verses_json(&self.config.secondary.label, book))?;

        let mapping_file = fs::File::open(&self.paths.mapping)
            .with_context(|| format!("Failed to open {}", self.paths.mapping.display()))?;
        let mapping = alignment::read_mapping(mapping_file, &self.mapping_columns())
            .with_context(|| format!("Bad mapping table {}", self.paths.mapping.display()))?;

        let rows = build_rows(&mapping, &primary, &secondary)?;

        let out = self.paths.rows_csv(book);
        let mut buf = vec![];
        alignment::write_rows(&mut buf, &rows)?;
        io::write_file(&out, &String::from_utf8_lossy(&buf))?;
        log::info!("aligned {} rows -> {}", rows.len(), out.display());
        Ok(out)
    }

    pub fn typeset(&self, format: OutputFormat) -> Result<PathBuf> {
        let rows_path = self.paths.rows_csv(&self.config.book);
        let rows_file = fs::File::open(&rows_path)
            .with_context(|| format!("Failed to open {}", rows_path.display()))?;
        let rows = alignment::read_rows(rows_file)
            .with_context(|| format!("Bad parallel rows {}", rows_path.display()))?;

        let document = &self.config.document;
        let meta = DocumentMeta {
            title: document.title.clone(),
            preamble: document.preamble.clone(),
            intro: document.intro.clone(),
        };
        let out = output_path(&self.paths.output, format);
        io::write_file(&out, &assemble(typesetter(format).as_ref(), &meta, &rows))?;
        log::info!("typeset {} rows -> {}", rows.len(), out.display());
        Ok(out)
    }

    pub fn build(&self, format: OutputFormat) -> Result<PathBuf> {
        self.unpack()?;
        for label in self.default_editions() {
            self.parse(&label)?;
        }
        self.align()?;
        self.typeset(format)
    }

    pub fn render(&self, encoded: &str, format: OutputFormat) -> String {
        render_verse(typesetter(format).as_ref(), encoded)
    }

    fn mapping_columns(&self) -> MappingColumns {
        MappingColumns {
            primary: self.config.mapping.primary.clone(),
            secondary: self.config.mapping.secondary.clone(),
        }
    }
}

pub fn typesetter(format: OutputFormat) -> Box<dyn Typesetter> {
    match format {
        OutputFormat::Latex => Box::new(Latex),
        OutputFormat::Html => Box::new(Html),
    }
}

/// HTML output goes next to the configured `.tex` path.
fn output_path(configured: &Path, format: OutputFormat) -> PathBuf {
    match format {
        OutputFormat::Html if configured.extension().is_some_and(|ext| ext == "tex") => {
            configured.with_extension("html")
        }
        _ => configured.to_path_buf(),
    }
}
