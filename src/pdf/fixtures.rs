//! In-memory PDFs for tests.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};

pub enum Link {
    Page(u32),
    GoTo(u32),
    Named(&'static str, u32),
    Uri(&'static str),
    None,
}

pub struct Bookmark {
    pub title: Object,
    pub link: Link,
    pub children: Vec<Bookmark>,
}

impl Bookmark {
    fn new(title: &str, link: Link) -> Self {
        Bookmark {
            title: Object::string_literal(title),
            link,
            children: Vec::new(),
        }
    }

    /// `/Dest [page /Fit]`
    pub fn page(title: &str, page: u32) -> Self {
        Self::new(title, Link::Page(page))
    }

    /// `/A << /S /GoTo /D [page /Fit] >>`
    pub fn goto(title: &str, page: u32) -> Self {
        Self::new(title, Link::GoTo(page))
    }

    /// `/Dest (name)`, registered in the catalog's name tree
    pub fn named(title: &str, name: &'static str, page: u32) -> Self {
        Self::new(title, Link::Named(name, page))
    }

    pub fn uri(title: &str, uri: &'static str) -> Self {
        Self::new(title, Link::Uri(uri))
    }

    pub fn bare(title: &str) -> Self {
        Self::new(title, Link::None)
    }

    pub fn utf16(title: &str, page: u32) -> Self {
        let mut bytes = vec![0xFE, 0xFF];
        bytes.extend(title.encode_utf16().flat_map(|u| u.to_be_bytes()));
        Bookmark {
            title: Object::String(bytes, StringFormat::Hexadecimal),
            link: Link::Page(page),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Bookmark>) -> Self {
        self.children = children;
        self
    }
}

/// Build a document with `num_pages` pages, each showing "Page N", and the
/// given bookmark tree (no `/Outlines` at all when `bookmarks` is empty).
pub fn build_pdf(num_pages: u32, bookmarks: &[Bookmark]) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut page_ids = Vec::new();
    for i in 0..num_pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
                Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
                Operation::new(
                    "Tj",
                    vec![Object::string_literal(format!("Page {}", i + 1))],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            content.encode().unwrap(),
        ));

        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
        ]);
        page_ids.push(doc.add_object(page));
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(num_pages as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);

    if !bookmarks.is_empty() {
        let outlines_id = doc.new_object_id();
        let mut names = Vec::new();
        let (first, last, count) =
            add_outline_items(&mut doc, outlines_id, bookmarks, &page_ids, &mut names);
        let outlines = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Outlines".to_vec())),
            ("First", Object::Reference(first)),
            ("Last", Object::Reference(last)),
            ("Count", Object::Integer(count)),
        ]);
        doc.objects.insert(outlines_id, Object::Dictionary(outlines));
        catalog.set("Outlines", Object::Reference(outlines_id));

        if !names.is_empty() {
            let dests = doc.add_object(Dictionary::from_iter(vec![(
                "Names",
                Object::Array(names),
            )]));
            let names_dict = Dictionary::from_iter(vec![("Dests", Object::Reference(dests))]);
            catalog.set("Names", Object::Dictionary(names_dict));
        }
    }

    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc
}

fn fit(page_id: ObjectId) -> Object {
    Object::Array(vec![
        Object::Reference(page_id),
        Object::Name(b"Fit".to_vec()),
    ])
}

fn add_outline_items(
    doc: &mut Document,
    parent: ObjectId,
    items: &[Bookmark],
    page_ids: &[ObjectId],
    names: &mut Vec<Object>,
) -> (ObjectId, ObjectId, i64) {
    let ids: Vec<ObjectId> = items.iter().map(|_| doc.new_object_id()).collect();
    let mut count = 0;

    for (i, item) in items.iter().enumerate() {
        let mut dict = Dictionary::from_iter(vec![
            ("Title", item.title.clone()),
            ("Parent", Object::Reference(parent)),
        ]);
        if i > 0 {
            dict.set("Prev", Object::Reference(ids[i - 1]));
        }
        if i + 1 < ids.len() {
            dict.set("Next", Object::Reference(ids[i + 1]));
        }

        match &item.link {
            Link::Page(p) => dict.set("Dest", fit(page_ids[*p as usize])),
            Link::GoTo(p) => dict.set(
                "A",
                Object::Dictionary(Dictionary::from_iter(vec![
                    ("S", Object::Name(b"GoTo".to_vec())),
                    ("D", fit(page_ids[*p as usize])),
                ])),
            ),
            Link::Named(name, p) => {
                dict.set("Dest", Object::string_literal(*name));
                names.push(Object::string_literal(*name));
                names.push(fit(page_ids[*p as usize]));
            }
            Link::Uri(uri) => dict.set(
                "A",
                Object::Dictionary(Dictionary::from_iter(vec![
                    ("S", Object::Name(b"URI".to_vec())),
                    ("URI", Object::string_literal(*uri)),
                ])),
            ),
            Link::None => {}
        }

        if !item.children.is_empty() {
            let (first, last, child_count) =
                add_outline_items(doc, ids[i], &item.children, page_ids, names);
            dict.set("First", Object::Reference(first));
            dict.set("Last", Object::Reference(last));
            dict.set("Count", Object::Integer(child_count));
            count += child_count;
        }

        doc.objects.insert(ids[i], Object::Dictionary(dict));
        count += 1;
    }

    (ids[0], ids[ids.len() - 1], count)
}

/// Point a page's `/Contents` at an object that does not exist.
pub fn break_page(doc: &mut Document, page: u32) {
    let page_id = doc.get_pages()[&(page + 1)];
    let missing = (doc.max_id + 100, 0);
    doc.get_dictionary_mut(page_id)
        .unwrap()
        .set("Contents", Object::Reference(missing));
}
