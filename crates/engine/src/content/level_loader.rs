use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use roxmltree::{Document, Node};

use crate::world::{
    Collectible, Container, ContainerKind, HostileEntity, HostileKind, ItemKind, LevelCoord,
    LevelMap, LevelPopulation, PeacefulEntity, PeacefulKind, Tile, Tilemap,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentErrorCode {
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownElement,
    DuplicateElement,
    MissingAttribute,
    InvalidValue,
    InvalidTiles,
    CoordMismatch,
}

#[derive(Debug, Clone)]
pub struct ContentError {
    pub code: ContentErrorCode,
    pub message: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (file={}, line={}, column={})",
                self.code,
                self.message,
                self.file_path.display(),
                loc.line,
                loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (file={})",
                self.code,
                self.message,
                self.file_path.display()
            ),
        }
    }
}

impl std::error::Error for ContentError {}

pub fn load_level_file(path: &Path) -> Result<LevelMap, ContentError> {
    let raw = fs::read_to_string(path).map_err(|error| ContentError {
        code: ContentErrorCode::ReadFile,
        message: format!("failed to read level file: {error}"),
        file_path: path.to_path_buf(),
        location: None,
    })?;
    parse_level(&raw, path)
}

/// Parses one `<Level column row>` document. `file_path` is only used for
/// error reporting.
pub fn parse_level(raw: &str, file_path: &Path) -> Result<LevelMap, ContentError> {
    let doc = Document::parse(raw).map_err(|error| ContentError {
        code: ContentErrorCode::XmlMalformed,
        message: format!("malformed XML: {error}"),
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        }),
    })?;
    let parser = LevelParser {
        doc: &doc,
        file_path,
    };
    parser.parse()
}

struct LevelParser<'d, 'input, 'p> {
    doc: &'d Document<'input>,
    file_path: &'p Path,
}

impl LevelParser<'_, '_, '_> {
    fn parse(&self) -> Result<LevelMap, ContentError> {
        let root = self.doc.root_element();
        if root.tag_name().name() != "Level" {
            return Err(self.error_at(
                ContentErrorCode::InvalidRoot,
                "root element must be <Level>".to_string(),
                root,
            ));
        }
        let coord = LevelCoord::new(
            self.parse_attr(root, "column")?,
            self.parse_attr(root, "row")?,
        );

        let mut tilemap: Option<Tilemap> = None;
        let mut population = LevelPopulation::default();
        for child in root.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "Tiles" => {
                    if tilemap.is_some() {
                        return Err(self.error_at(
                            ContentErrorCode::DuplicateElement,
                            "a level may contain only one <Tiles> element".to_string(),
                            child,
                        ));
                    }
                    tilemap = Some(self.parse_tiles(child)?);
                }
                "Hostile" => population.hostiles.push(self.parse_hostile(child)?),
                "Peaceful" => population.peaceful.push(self.parse_peaceful(child)?),
                "Chest" => population.containers.push(self.parse_chest(child)?),
                "Item" => {
                    let kind = self.parse_item_kind(child)?;
                    population.items.push(Collectible::new(
                        self.parse_attr(child, "x")?,
                        self.parse_attr(child, "y")?,
                        kind,
                    ));
                }
                other => {
                    return Err(self.error_at(
                        ContentErrorCode::UnknownElement,
                        format!("unknown element <{other}> in <Level>"),
                        child,
                    ));
                }
            }
        }

        let Some(tilemap) = tilemap else {
            return Err(self.error_at(
                ContentErrorCode::InvalidTiles,
                "missing required <Tiles> element".to_string(),
                root,
            ));
        };
        Ok(LevelMap::new(coord, tilemap, population))
    }

    fn parse_tiles(&self, node: Node<'_, '_>) -> Result<Tilemap, ContentError> {
        let text = node.text().unwrap_or_default();
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let width = rows.first().map(|row| row.chars().count()).unwrap_or(0);

        let mut tiles = Vec::with_capacity(width * rows.len());
        for (index, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(self.error_at(
                    ContentErrorCode::InvalidTiles,
                    format!(
                        "tile row {index} has {} columns; expected {width}",
                        row.chars().count()
                    ),
                    node,
                ));
            }
            for ch in row.chars() {
                let tile = Tile::from_char(ch).ok_or_else(|| {
                    self.error_at(
                        ContentErrorCode::InvalidTiles,
                        format!("unknown tile '{ch}' in row {index}; allowed: '#', '.', '~'"),
                        node,
                    )
                })?;
                tiles.push(tile);
            }
        }

        Tilemap::new(width as u32, rows.len() as u32, tiles).map_err(|error| {
            self.error_at(ContentErrorCode::InvalidTiles, error.to_string(), node)
        })
    }

    fn parse_hostile(&self, node: Node<'_, '_>) -> Result<HostileEntity, ContentError> {
        let token = self.required_attr(node, "kind")?;
        let kind = HostileKind::from_token(token).ok_or_else(|| {
            self.error_at(
                ContentErrorCode::InvalidValue,
                format!("unknown hostile kind '{token}'; allowed: ghost, skeleton"),
                node,
            )
        })?;
        let (default_health, default_damage) = kind.default_stats();
        Ok(HostileEntity::new(
            kind,
            self.parse_attr(node, "x")?,
            self.parse_attr(node, "y")?,
            self.parse_optional_attr(node, "health")?
                .unwrap_or(default_health),
            self.parse_optional_attr(node, "damage")?
                .unwrap_or(default_damage),
        ))
    }

    fn parse_peaceful(&self, node: Node<'_, '_>) -> Result<PeacefulEntity, ContentError> {
        let kind = match self.required_attr(node, "kind")? {
            "dungeon_entrance" => PeacefulKind::DungeonEntrance {
                target: LevelCoord::new(
                    self.parse_attr(node, "target_column")?,
                    self.parse_attr(node, "target_row")?,
                ),
                spawn_x: self.parse_attr(node, "spawn_x")?,
                spawn_y: self.parse_attr(node, "spawn_y")?,
            },
            "tree_of_health" => PeacefulKind::TreeOfHealth,
            "villager" => PeacefulKind::Villager {
                message: self.required_attr(node, "message")?.to_string(),
            },
            other => {
                return Err(self.error_at(
                    ContentErrorCode::InvalidValue,
                    format!(
                        "unknown peaceful kind '{other}'; allowed: dungeon_entrance, tree_of_health, villager"
                    ),
                    node,
                ));
            }
        };
        Ok(PeacefulEntity::new(
            self.parse_attr(node, "x")?,
            self.parse_attr(node, "y")?,
            kind,
        ))
    }

    fn parse_chest(&self, node: Node<'_, '_>) -> Result<Container, ContentError> {
        let token = self.required_attr(node, "kind")?;
        let kind = ContainerKind::from_token(token).ok_or_else(|| {
            self.error_at(
                ContentErrorCode::InvalidValue,
                format!("unknown chest kind '{token}'; allowed: wooden, stone_sword"),
                node,
            )
        })?;
        let x = self.parse_attr(node, "x")?;
        let y = self.parse_attr(node, "y")?;

        let mut inventory = Vec::new();
        for child in node.children().filter(Node::is_element) {
            if child.tag_name().name() != "Item" {
                return Err(self.error_at(
                    ContentErrorCode::UnknownElement,
                    format!("unknown element <{}> in <Chest>", child.tag_name().name()),
                    child,
                ));
            }
            inventory.push(Collectible::new(x, y, self.parse_item_kind(child)?));
        }
        Ok(Container::new(x, y, kind, inventory))
    }

    fn parse_item_kind(&self, node: Node<'_, '_>) -> Result<ItemKind, ContentError> {
        let token = self.required_attr(node, "kind")?;
        ItemKind::from_token(token).ok_or_else(|| {
            self.error_at(
                ContentErrorCode::InvalidValue,
                format!("unknown item kind '{token}'; allowed: coin, health, max_health"),
                node,
            )
        })
    }

    fn required_attr<'n>(&self, node: Node<'n, '_>, name: &str) -> Result<&'n str, ContentError> {
        node.attribute(name).ok_or_else(|| {
            self.error_at(
                ContentErrorCode::MissingAttribute,
                format!(
                    "missing required attribute '{name}' on <{}>",
                    node.tag_name().name()
                ),
                node,
            )
        })
    }

    fn parse_attr<T: FromStr>(&self, node: Node<'_, '_>, name: &str) -> Result<T, ContentError> {
        let raw = self.required_attr(node, name)?;
        self.parse_value(node, name, raw)
    }

    fn parse_optional_attr<T: FromStr>(
        &self,
        node: Node<'_, '_>,
        name: &str,
    ) -> Result<Option<T>, ContentError> {
        node.attribute(name)
            .map(|raw| self.parse_value(node, name, raw))
            .transpose()
    }

    fn parse_value<T: FromStr>(
        &self,
        node: Node<'_, '_>,
        name: &str,
        raw: &str,
    ) -> Result<T, ContentError> {
        raw.trim().parse::<T>().map_err(|_| {
            self.error_at(
                ContentErrorCode::InvalidValue,
                format!(
                    "attribute '{name}' on <{}> has invalid value '{raw}'",
                    node.tag_name().name()
                ),
                node,
            )
        })
    }

    fn error_at(&self, code: ContentErrorCode, message: String, node: Node<'_, '_>) -> ContentError {
        let pos = self.doc.text_pos_at(node.range().start);
        ContentError {
            code,
            message,
            file_path: self.file_path.to_path_buf(),
            location: Some(SourceLocation {
                line: pos.row as usize,
                column: pos.col as usize,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::world::Body;

    const SMALL_LEVEL: &str = r#"<Level column="2" row="4">
        <Tiles>
            ####
            #..#
            #.~#
            ####
        </Tiles>
        <Hostile kind="ghost" x="70" y="70"/>
        <Hostile kind="skeleton" x="130" y="70" health="9" damage="3"/>
        <Peaceful kind="dungeon_entrance" x="70" y="130" target_column="0" target_row="0" spawn_x="480" spawn_y="900"/>
        <Peaceful kind="villager" x="130" y="130" message="Beware the ghosts."/>
        <Peaceful kind="tree_of_health" x="100" y="100"/>
        <Chest kind="stone_sword" x="80" y="90">
            <Item kind="coin"/>
            <Item kind="max_health"/>
        </Chest>
        <Item kind="health" x="75" y="75"/>
    </Level>"#;

    fn path() -> PathBuf {
        PathBuf::from("level_2_4.xml")
    }

    #[test]
    fn parses_tiles_and_population() {
        let level = parse_level(SMALL_LEVEL, &path()).expect("parse");
        assert_eq!(level.coord(), LevelCoord::new(2, 4));
        assert_eq!(level.tilemap().width(), 4);
        assert_eq!(level.tilemap().height(), 4);
        assert_eq!(level.tilemap().tile_at(1, 1), Some(Tile::Floor));
        assert_eq!(level.tilemap().tile_at(2, 2), Some(Tile::Water));
        assert_eq!(level.tilemap().tile_at(0, 0), Some(Tile::Wall));

        let population = level.population();
        assert_eq!(population.hostiles.len(), 2);
        assert_eq!(population.hostiles[0].kind(), HostileKind::Ghost);
        assert_eq!(population.hostiles[1].base().health(), 9);
        assert_eq!(population.peaceful.len(), 3);
        assert_eq!(
            population.peaceful[0].kind(),
            &PeacefulKind::DungeonEntrance {
                target: LevelCoord::new(0, 0),
                spawn_x: 480,
                spawn_y: 900,
            }
        );
        assert_eq!(population.containers.len(), 1);
        assert_eq!(population.containers[0].kind(), ContainerKind::StoneSword);
        let mut chest = population.containers[0].clone();
        assert_eq!(chest.open().map(<[Collectible]>::len), Some(2));
        assert_eq!(population.items, vec![Collectible::new(75, 75, ItemKind::Health)]);
    }

    #[test]
    fn hostile_without_stats_uses_kind_defaults() {
        let level = parse_level(SMALL_LEVEL, &path()).expect("parse");
        let ghost = &level.population().hostiles[0];
        assert_eq!(ghost.base().health(), HostileKind::Ghost.default_stats().0);
    }

    #[test]
    fn ragged_tile_rows_are_rejected() {
        let raw = r#"<Level column="0" row="0"><Tiles>
            ###
            ##
        </Tiles></Level>"#;
        let err = parse_level(raw, &path()).expect_err("err");
        assert_eq!(err.code, ContentErrorCode::InvalidTiles);
        assert!(err.location.is_some());
    }

    #[test]
    fn unknown_tile_character_is_rejected() {
        let raw = r#"<Level column="0" row="0"><Tiles>#x#</Tiles></Level>"#;
        let err = parse_level(raw, &path()).expect_err("err");
        assert_eq!(err.code, ContentErrorCode::InvalidTiles);
        assert!(err.message.contains("'x'"));
    }

    #[test]
    fn missing_tiles_is_an_error() {
        let raw = r#"<Level column="0" row="0"><Item kind="coin" x="1" y="1"/></Level>"#;
        let err = parse_level(raw, &path()).expect_err("err");
        assert_eq!(err.code, ContentErrorCode::InvalidTiles);
    }

    #[test]
    fn wrong_root_and_unknown_elements_error() {
        let err = parse_level("<Defs/>", &path()).expect_err("err");
        assert_eq!(err.code, ContentErrorCode::InvalidRoot);

        let raw = r#"<Level column="0" row="0"><Tiles>.</Tiles><Dragon/></Level>"#;
        let err = parse_level(raw, &path()).expect_err("err");
        assert_eq!(err.code, ContentErrorCode::UnknownElement);
    }

    #[test]
    fn missing_and_invalid_attributes_error() {
        let raw = r#"<Level column="0"><Tiles>.</Tiles></Level>"#;
        let err = parse_level(raw, &path()).expect_err("err");
        assert_eq!(err.code, ContentErrorCode::MissingAttribute);

        let raw = r#"<Level column="0" row="0"><Tiles>.</Tiles><Hostile kind="ghost" x="left" y="1"/></Level>"#;
        let err = parse_level(raw, &path()).expect_err("err");
        assert_eq!(err.code, ContentErrorCode::InvalidValue);

        let raw = r#"<Level column="0" row="0"><Tiles>.</Tiles><Hostile kind="dragon" x="1" y="1"/></Level>"#;
        let err = parse_level(raw, &path()).expect_err("err");
        assert_eq!(err.code, ContentErrorCode::InvalidValue);
    }

    #[test]
    fn malformed_xml_reports_location() {
        let err = parse_level("<Level><Tiles></Level>", &path()).expect_err("err");
        assert_eq!(err.code, ContentErrorCode::XmlMalformed);
        assert!(err.location.is_some());
        assert!(err.to_string().contains("level_2_4.xml"));
    }

    #[test]
    fn loads_from_disk_and_reports_missing_files() {
        let temp = TempDir::new().expect("temp");
        let file = temp.path().join("level_2_4.xml");
        fs::write(&file, SMALL_LEVEL).expect("write");
        let level = load_level_file(&file).expect("load");
        assert_eq!(level.coord(), LevelCoord::new(2, 4));

        let err = load_level_file(&temp.path().join("missing.xml")).expect_err("err");
        assert_eq!(err.code, ContentErrorCode::ReadFile);
        assert!(err.location.is_none());
    }
}
