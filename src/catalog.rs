//! The in-memory color catalog: seeded baseline entries plus colors
//! prepended by extraction sessions.

use std::collections::HashSet;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::color::{Cmyk, Color};
use crate::error::PaletteError;

/// Category a catalog entry is archived under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Official,
    Campus,
    Nature,
    Architecture,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Official,
        Category::Campus,
        Category::Nature,
        Category::Architecture,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Official => "Official",
            Category::Campus => "Campus",
            Category::Nature => "Nature",
            Category::Architecture => "Architecture",
        }
    }

    /// Archive label printed on color cards.
    pub fn archive_label(self) -> &'static str {
        match self {
            Category::Official => "标准色",
            Category::Campus => "校园文化",
            Category::Nature => "自然景观",
            Category::Architecture => "校园建筑",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Category selection for the catalog view. `All` applies no filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// The filter tabs in display order.
    pub const TABS: [CategoryFilter; 5] = [
        CategoryFilter::All,
        CategoryFilter::Only(Category::Official),
        CategoryFilter::Only(Category::Campus),
        CategoryFilter::Only(Category::Nature),
        CategoryFilter::Only(Category::Architecture),
    ];

    pub fn matches(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => c == category,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CategoryFilter::All => "All",
            CategoryFilter::Only(c) => c.label(),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(CategoryFilter::All),
            "official" => Ok(CategoryFilter::Only(Category::Official)),
            "campus" => Ok(CategoryFilter::Only(Category::Campus)),
            "nature" => Ok(CategoryFilter::Only(Category::Nature)),
            "architecture" => Ok(CategoryFilter::Only(Category::Architecture)),
            other => Err(format!(
                "unknown category '{other}' (expected all, official, campus, nature or architecture)"
            )),
        }
    }
}

/// One named, categorized color record.
///
/// The hex and RGB forms are both rendered from `color`, so they cannot
/// disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorEntry {
    pub id: String,
    pub display_name: String,
    pub palette_code: String,
    pub color: Color,
    pub provenance: String,
    pub category: Category,
}

impl ColorEntry {
    /// The name without its parenthetical gloss: `"工院红 (Official Crimson)"`
    /// becomes `"工院红"`.
    pub fn short_name(&self) -> &str {
        match self.display_name.split_once(" (") {
            Some((short, _)) => short,
            None => &self.display_name,
        }
    }

    pub fn hex(&self) -> String {
        self.color.to_hex()
    }

    pub fn rgb(&self) -> [u8; 3] {
        [self.color.r, self.color.g, self.color.b]
    }
}

/// Everything the detail view shows for a selected entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorDetail<'a> {
    pub entry: &'a ColorEntry,
    pub hex: String,
    pub rgb: [u8; 3],
    pub cmyk: Cmyk,
}

struct BaselineColor {
    name: &'static str,
    palette_code: &'static str,
    hex: &'static str,
    provenance: &'static str,
    category: Category,
}

const BASELINE: [BaselineColor; 12] = [
    BaselineColor {
        name: "工院红 (Official Crimson)",
        palette_code: "PANTONE 19-1763 TCX",
        hex: "#96191C",
        provenance: "校徽标准红",
        category: Category::Official,
    },
    BaselineColor {
        name: "博学蓝 (Official Wisdom Blue)",
        palette_code: "PANTONE 19-4052 TCX",
        hex: "#003F87",
        provenance: "校徽标准蓝",
        category: Category::Official,
    },
    BaselineColor {
        name: "开物砖红 (Academic Brick)",
        palette_code: "PANTONE 18-1448 TCX",
        hex: "#B24E3D",
        provenance: "教学楼外墙建筑色",
        category: Category::Architecture,
    },
    BaselineColor {
        name: "陇原天青 (Longyuan Azure)",
        palette_code: "PANTONE 16-4132 TCX",
        hex: "#4A90E2",
        provenance: "校门与操场之上的蓝天",
        category: Category::Nature,
    },
    BaselineColor {
        name: "明德湖翠 (Mingde Emerald)",
        palette_code: "PANTONE 17-0336 TCX",
        hex: "#5C9032",
        provenance: "校园草坪与明德湖畔植被",
        category: Category::Nature,
    },
    BaselineColor {
        name: "启智石米 (Modern Stone)",
        palette_code: "PANTONE 14-1118 TPG",
        hex: "#D2C4B1",
        provenance: "图书馆石质墙面",
        category: Category::Architecture,
    },
    BaselineColor {
        name: "体育馆晖 (Gymnasium Sunset)",
        palette_code: "PANTONE 14-1064 TCX",
        hex: "#F5A623",
        provenance: "体育馆落日余晖",
        category: Category::Nature,
    },
    BaselineColor {
        name: "春日绯桃 (Peach Blossom)",
        palette_code: "PANTONE 13-2804 TCX",
        hex: "#F48FB1",
        provenance: "校园春季盛开的花卉",
        category: Category::Nature,
    },
    BaselineColor {
        name: "逐梦深空 (Dreamer Navy)",
        palette_code: "PANTONE 19-4024 TCX",
        hex: "#1A2B48",
        provenance: "明德湖倒影与夜晚建筑",
        category: Category::Architecture,
    },
    BaselineColor {
        name: "晨曦柳黄 (Willow Bud)",
        palette_code: "PANTONE 13-0632 TCX",
        hex: "#E1E34E",
        provenance: "湖边初春的新柳芽",
        category: Category::Nature,
    },
    BaselineColor {
        name: "毕业芳草 (Graduation Field)",
        palette_code: "PANTONE 15-0343 TCX",
        hex: "#82C91E",
        provenance: "操场草地与毕业合影背景",
        category: Category::Nature,
    },
    BaselineColor {
        name: "礼堂米白 (Hall Ivory)",
        palette_code: "PANTONE 11-0105 TCX",
        hex: "#F2F2E9",
        provenance: "大礼堂阶梯与地砖",
        category: Category::Architecture,
    },
];

/// Ordered, append-only collection of catalog entries. Newest first.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<ColorEntry>,
}

impl Catalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The seeded palette, ids `"1"` through `"12"`.
    pub fn baseline() -> Self {
        let entries = BASELINE
            .iter()
            .enumerate()
            .filter_map(|(i, seed)| {
                let color = match Color::from_hex(seed.hex) {
                    Ok(color) => color,
                    Err(e) => {
                        log::error!("skipping baseline color {}: {e}", seed.name);
                        return None;
                    }
                };
                Some(ColorEntry {
                    id: (i + 1).to_string(),
                    display_name: seed.name.to_string(),
                    palette_code: seed.palette_code.to_string(),
                    color,
                    provenance: seed.provenance.to_string(),
                    category: seed.category,
                })
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[ColorEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries matching `filter`, in catalog order.
    pub fn filter(&self, filter: CategoryFilter) -> impl Iterator<Item = &ColorEntry> + '_ {
        self.entries
            .iter()
            .filter(move |entry| filter.matches(entry.category))
    }

    pub fn get(&self, id: &str) -> Option<&ColorEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Full detail for the entry with `id`, for the modal view.
    pub fn select(&self, id: &str) -> Option<ColorDetail<'_>> {
        self.get(id).map(|entry| ColorDetail {
            entry,
            hex: entry.hex(),
            rgb: entry.rgb(),
            cmyk: entry.color.to_cmyk(),
        })
    }

    /// Insert `batch` ahead of every existing entry, keeping the batch order.
    ///
    /// The whole batch is checked before anything is inserted: an id that
    /// collides with the catalog or with another entry of the batch rejects
    /// the batch and leaves the catalog unchanged.
    pub fn prepend(&mut self, batch: Vec<ColorEntry>) -> Result<(), PaletteError> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(batch.len());
        for entry in &batch {
            if self.contains_id(&entry.id) || !seen.insert(entry.id.as_str()) {
                return Err(PaletteError::DuplicateIdentifier {
                    id: entry.id.clone(),
                });
            }
        }
        log::info!("prepending {} color(s) to the catalog", batch.len());
        self.entries.splice(0..0, batch);
        Ok(())
    }
}

/// Generates catalog ids of the form `extracted-{unix_millis}-{ordinal}`.
///
/// The ordinal increases with every id handed out, so ids stay distinct
/// even when several are generated within the same millisecond.
#[derive(Debug, Default)]
pub struct IdGenerator {
    ordinal: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let id = format!("extracted-{millis}-{}", self.ordinal);
        self.ordinal += 1;
        id
    }
}
