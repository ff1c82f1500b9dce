//! PDF 引擎 - 业务能力层
//!
//! 单页转换（`PageConverter`）和累积写入（`PdfAccumulator`）

use std::path::Path;

use lopdf::{dictionary, Document, Object, ObjectId};
use svg2pdf::usvg;

use crate::error::AssemblyError;

/// 页面继承属性，从源文档的 Pages 节点补到每一页上
const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// 单页转换能力：把一个页面文件转换成只含该页的 PDF 文档
pub trait PageConverter {
    fn convert(&self, page: &Path) -> Result<Document, AssemblyError>;
}

/// 用 usvg + svg2pdf 把 SVG 转成 PDF
pub struct Svg2PdfConverter {
    options: usvg::Options<'static>,
}

impl Svg2PdfConverter {
    pub fn new() -> Self {
        Self {
            options: usvg::Options::default(),
        }
    }
}

impl Default for Svg2PdfConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl PageConverter for Svg2PdfConverter {
    fn convert(&self, page: &Path) -> Result<Document, AssemblyError> {
        let path = page.display().to_string();
        let svg = std::fs::read(page).map_err(|source| AssemblyError::Read {
            path: path.clone(),
            source,
        })?;

        let tree = usvg::Tree::from_data(&svg, &self.options)
            .map_err(|e| AssemblyError::conversion(&path, e))?;
        let pdf = svg2pdf::to_pdf(
            &tree,
            svg2pdf::ConversionOptions::default(),
            svg2pdf::PageOptions::default(),
        )
        .map_err(|e| AssemblyError::conversion(&path, e))?;

        Document::load_mem(&pdf).map_err(|e| AssemblyError::conversion(&path, e))
    }
}

/// 累积写入器：按追加顺序把各文档的页面合并到一个 PDF
pub struct PdfAccumulator {
    document: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
}

impl PdfAccumulator {
    pub fn new() -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        Self {
            document,
            pages_id,
            page_ids: Vec::new(),
        }
    }

    /// 已追加的页数
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// 追加一个文档的全部页面，返回追加的页数
    pub fn append(&mut self, mut source: Document) -> usize {
        source.renumber_objects_with(self.document.max_id + 1);
        self.document.max_id = self.document.max_id.max(source.max_id);

        let source_pages: Vec<ObjectId> = source.get_pages().into_values().collect();
        for &page_id in &source_pages {
            inherit_page_attributes(&mut source, page_id);
        }

        for (id, mut object) in std::mem::take(&mut source.objects) {
            let kind = object.type_name().map(str::to_string).unwrap_or_default();
            match kind.as_str() {
                "Catalog" | "Pages" | "Outlines" | "Outline" => {}
                "Page" => {
                    if let Ok(dict) = object.as_dict_mut() {
                        dict.set("Parent", self.pages_id);
                    }
                    self.document.objects.insert(id, object);
                }
                _ => {
                    self.document.objects.insert(id, object);
                }
            }
        }

        self.page_ids.extend(&source_pages);
        source_pages.len()
    }

    /// 写出最终文档
    pub fn save(mut self, path: &Path) -> Result<(), AssemblyError> {
        let kids: Vec<Object> = self.page_ids.iter().map(|&id| Object::Reference(id)).collect();
        let pages = dictionary! {
            "Type" => Object::Name(b"Pages".to_vec()),
            "Kids" => kids,
            "Count" => Object::Integer(self.page_ids.len() as i64),
        };
        self.document
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.document.add_object(dictionary! {
            "Type" => Object::Name(b"Catalog".to_vec()),
            "Pages" => self.pages_id,
        });
        self.document.trailer.set("Root", catalog_id);
        self.document.compress();

        self.document
            .save(path)
            .map(|_| ())
            .map_err(|e| AssemblyError::Save {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
    }
}

impl Default for PdfAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

/// 把页面从父节点继承的属性直接写到页面上
fn inherit_page_attributes(doc: &mut Document, page_id: ObjectId) {
    let mut inherited: Vec<(&[u8], Object)> = Vec::new();
    let mut parent = parent_of(doc, page_id);
    let mut depth = 0;

    while let Some(id) = parent {
        let Ok(dict) = doc.get_dictionary(id) else {
            break;
        };
        for key in INHERITABLE_KEYS {
            if inherited.iter().all(|(k, _)| *k != key) {
                if let Ok(value) = dict.get(key) {
                    inherited.push((key, value.clone()));
                }
            }
        }
        depth += 1;
        parent = if depth < 32 { parent_of(doc, id) } else { None };
    }

    if let Ok(page) = doc.get_dictionary_mut(page_id) {
        for (key, value) in inherited {
            if !page.has(key) {
                page.set(key.to_vec(), value);
            }
        }
    }
}

fn parent_of(doc: &Document, id: ObjectId) -> Option<ObjectId> {
    doc.get_dictionary(id)
        .and_then(|d| d.get(b"Parent"))
        .and_then(Object::as_reference)
        .ok()
}
