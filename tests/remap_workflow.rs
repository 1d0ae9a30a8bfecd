//! End-to-end remapping runs over on-disk source trees.

use proptest::prelude::*;
use std::fs;
use std::path::Path;
use symbol_remap::apply::{Corrections, FileRemapper};
use symbol_remap::rangemap::RangeMap;
use symbol_remap::rename::RenameTables;
use symbol_remap::{ErrorKind, RemapConfig, Remapper, SourceRoot, SymbolKey};
use tempfile::TempDir;

const BLOCK: &str = "\
package net.minecraft.server;

import java.util.Random;

public class Block {
    public static final Block STONE = new Block(1);
    public int a;

    public Block(int i) {
        this.a = i;
    }

    public void b(World world, int j) {
        world.c(this, j);
    }
}
";

const WORLD: &str = "\
package net.minecraft.server;

public class World {
    public void c(Block block, int k) {
        int m = k;
    }
}
";

const CRAFT_BLOCK: &str = "\
package org.bukkit.craftbukkit;

import net.minecraft.server.Block;

public class CraftBlock {
    private net.minecraft.server.Block handle;
    private Block other;
}
";

const MAPPINGS: &str = "\
CL: net/minecraft/server/Block net/minecraft/block/Block
CL: net/minecraft/server/World net/minecraft/world/World
FD: net/minecraft/server/Block/a net/minecraft/block/Block/blockID
MD: net/minecraft/server/Block/b (Lnet/minecraft/server/World;I)V net/minecraft/block/Block/onBlockAdded (Lnet/minecraft/world/World;I)V
MD: net/minecraft/server/World/c (Lnet/minecraft/server/Block;I)V net/minecraft/world/World/notifyBlock (Lnet/minecraft/block/Block;I)V
";

const EXC: &str = "\
net/minecraft/block/Block.onBlockAdded(Lnet/minecraft/world/World;I)V=|par1World,par2
net/minecraft/block/Block.<init>(I)V=|par1
";

const LV_RANGES: &str = "\
@|/mcp/net/minecraft/world/World.java|0|5|count|localvar|net.minecraft.world.World|notifyBlock|(Lnet/minecraft/block/Block;I)V|count|0
";

const CONFIG: &str = r#"
[sources]
src_root = "src"
range_map = "ranges.txt"
srg = ["mappings.srg"]
lv_range_map = "lv-ranges.txt"

[parameters]
exc = "params.exc"

[namespace]
renamed = "net/minecraft"

[output]
git = ""

[[trees]]
prefix = "net/minecraft/"
mode = "rename"

[[trees]]
prefix = "org/bukkit/"
mode = "qualify"
annotate = true
"#;

/// Builds range map lines, locating each occurrence as the last match of
/// `text` inside a unique `anchor`.
#[derive(Default)]
struct Ranges {
    lines: Vec<String>,
}

impl Ranges {
    fn add(&mut self, file: &str, source: &str, anchor: &str, text: &str, kind_info: &str) {
        let anchor_at = source
            .find(anchor)
            .unwrap_or_else(|| panic!("anchor {anchor:?} not in {file}"));
        let start = anchor_at + anchor.rfind(text).unwrap();
        self.lines.push(format!(
            "@|{file}|{start}|{}|{text}|{kind_info}",
            start + text.len()
        ));
    }

    fn render(&self) -> String {
        self.lines.join("\n") + "\n"
    }
}

fn range_map() -> String {
    const B: &str = "net/minecraft/server/Block.java";
    const W: &str = "net/minecraft/server/World.java";
    const C: &str = "org/bukkit/craftbukkit/CraftBlock.java";
    const B_SIG: &str = "(Lnet/minecraft/server/World;I)V";
    const W_SIG: &str = "(Lnet/minecraft/server/Block;I)V";

    let mut r = Ranges::default();

    r.add(B, BLOCK, "package net.minecraft.server;", "net.minecraft.server", "package|net.minecraft.server|(file)");
    r.add(B, BLOCK, "class Block {", "Block", "class|net.minecraft.server.Block");
    r.add(B, BLOCK, "final Block STONE", "Block", "class|net.minecraft.server.Block");
    r.add(B, BLOCK, "new Block(1)", "Block", "method|net.minecraft.server.Block|Block|(I)V");
    r.add(B, BLOCK, "int a;", "a", "field|net.minecraft.server.Block|a");
    r.add(B, BLOCK, "public Block(int i)", "Block", "method|net.minecraft.server.Block|Block|(I)V");
    r.add(B, BLOCK, "(int i)", "i", "param|net.minecraft.server.Block|Block|(I)V|i|0");
    r.add(B, BLOCK, "this.a =", "this", "class|net.minecraft.server.Block");
    r.add(B, BLOCK, "this.a =", "a", "field|net.minecraft.server.Block|a");
    r.add(B, BLOCK, "= i;", "i", "param|net.minecraft.server.Block|Block|(I)V|i|0");
    r.add(B, BLOCK, "void b(", "b", &format!("method|net.minecraft.server.Block|b|{B_SIG}"));
    r.add(B, BLOCK, "(World world", "World", "class|net.minecraft.server.World");
    r.add(B, BLOCK, "World world,", "world", &format!("param|net.minecraft.server.Block|b|{B_SIG}|world|0"));
    r.add(B, BLOCK, "int j)", "j", &format!("param|net.minecraft.server.Block|b|{B_SIG}|j|1"));
    r.add(B, BLOCK, "world.c(", "world", &format!("param|net.minecraft.server.Block|b|{B_SIG}|world|0"));
    r.add(B, BLOCK, "world.c(", "c", &format!("method|net.minecraft.server.World|c|{W_SIG}"));
    r.add(B, BLOCK, "this, j)", "j", &format!("param|net.minecraft.server.Block|b|{B_SIG}|j|1"));

    r.add(W, WORLD, "package net.minecraft.server;", "net.minecraft.server", "package|net.minecraft.server|(file)");
    r.add(W, WORLD, "class World {", "World", "class|net.minecraft.server.World");
    r.add(W, WORLD, "void c(", "c", &format!("method|net.minecraft.server.World|c|{W_SIG}"));
    r.add(W, WORLD, "(Block block", "Block", "class|net.minecraft.server.Block");
    r.add(W, WORLD, "int k)", "k", &format!("param|net.minecraft.server.World|c|{W_SIG}|k|1"));
    r.add(W, WORLD, "int m", "m", &format!("localvar|net.minecraft.server.World|c|{W_SIG}|m|0"));

    r.add(C, CRAFT_BLOCK, "private net.minecraft.server.Block", "net.minecraft.server", "package|net.minecraft.server|net.minecraft.server.Block");
    r.add(C, CRAFT_BLOCK, "server.Block handle", "Block", "class|net.minecraft.server.Block");
    r.add(C, CRAFT_BLOCK, "private Block other", "Block", "class|net.minecraft.server.Block");

    r.render()
}

fn write(dir: &Path, relative: &str, contents: &str) {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn setup_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "src/net/minecraft/server/Block.java", BLOCK);
    write(root, "src/net/minecraft/server/World.java", WORLD);
    write(root, "src/org/bukkit/craftbukkit/CraftBlock.java", CRAFT_BLOCK);
    write(root, "mappings.srg", MAPPINGS);
    write(root, "params.exc", EXC);
    write(root, "lv-ranges.txt", LV_RANGES);
    write(root, "ranges.txt", &range_map());
    write(root, "remap.toml", CONFIG);
    dir
}

#[test]
fn test_full_run_rewrites_and_moves() {
    let dir = setup_tree();
    let config = RemapConfig::load(dir.path().join("remap.toml")).unwrap();
    let summary = Remapper::new(config).unwrap().run().unwrap();

    let src = dir.path().join("src");
    assert!(!src.join("net/minecraft/server/Block.java").exists());
    assert!(!src.join("net/minecraft/server/World.java").exists());

    let block = fs::read_to_string(src.join("net/minecraft/block/Block.java")).unwrap();
    assert_eq!(
        block,
        "\
package net.minecraft.block;

import java.util.Random;
import net.minecraft.world.World;

public class Block {
    public static final Block STONE = new Block(1);
    public int blockID;

    public Block(int par1) {
        this.blockID = par1;
    }

    public void onBlockAdded(World par1World, int par2) {
        par1World.notifyBlock(this, par2);
    }
}
"
    );

    let world = fs::read_to_string(src.join("net/minecraft/world/World.java")).unwrap();
    assert_eq!(
        world,
        "\
package net.minecraft.world;
import net.minecraft.block.Block;

public class World {
    public void notifyBlock(Block block, int k) {
        int count = k;
    }
}
"
    );

    let craft = fs::read_to_string(src.join("org/bukkit/craftbukkit/CraftBlock.java")).unwrap();
    assert_eq!(
        craft,
        "\
package org.bukkit.craftbukkit;


public class CraftBlock {
    private net.minecraft.block.Block/*was:Block*/ handle;
    private net.minecraft.block.Block/*was:Block*/ other;
}
"
    );

    assert_eq!(summary.files, 3);
    assert_eq!(summary.changed, 3);
    assert_eq!(summary.relocated, 2);
    assert_eq!(summary.imports_added, 2);
}

#[test]
fn test_dry_run_leaves_tree_untouched() {
    let dir = setup_tree();
    let config = RemapConfig::load(dir.path().join("remap.toml")).unwrap();
    let remapper = Remapper::new(config).unwrap();
    let plan = remapper.plan().unwrap();

    assert_eq!(plan.changed().count(), 3);
    let src = dir.path().join("src");
    assert_eq!(
        fs::read_to_string(src.join("net/minecraft/server/Block.java")).unwrap(),
        BLOCK
    );
    assert!(!src.join("net/minecraft/block").exists());
}

#[test]
fn test_rewrite_without_relocation() {
    let dir = setup_tree();
    let config = CONFIG.replace("git = \"\"", "git = \"\"\nrename_files = false");
    write(dir.path(), "remap.toml", &config);

    let config = RemapConfig::load(dir.path().join("remap.toml")).unwrap();
    Remapper::new(config).unwrap().run().unwrap();

    let block = fs::read_to_string(dir.path().join("src/net/minecraft/server/Block.java")).unwrap();
    assert!(block.starts_with("package net.minecraft.block;"));
}

#[test]
fn test_overlapping_ranges_refused_before_any_write() {
    let dir = setup_tree();
    let overlapping = format!(
        "{}@|net/minecraft/server/Block.java|31|36|impor|class|net.minecraft.server.Block\n\
         @|net/minecraft/server/Block.java|33|38|port |class|net.minecraft.server.Block\n",
        range_map()
    );
    write(dir.path(), "ranges.txt", &overlapping);

    let config = RemapConfig::load(dir.path().join("remap.toml")).unwrap();
    let err = Remapper::new(config).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::ConsistencyViolation);
    assert_eq!(
        fs::read_to_string(dir.path().join("src/net/minecraft/server/Block.java")).unwrap(),
        BLOCK
    );
}

#[test]
fn test_malformed_mapping_is_fatal() {
    let dir = setup_tree();
    write(dir.path(), "mappings.srg", "CL net/minecraft/server/Block Block\n");
    let config = RemapConfig::load(dir.path().join("remap.toml")).unwrap();
    let err = Remapper::new(config).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::MalformedInput);
}

#[test]
fn test_missing_source_file_is_io_error() {
    let dir = setup_tree();
    fs::remove_file(dir.path().join("src/net/minecraft/server/World.java")).unwrap();
    let config = RemapConfig::load(dir.path().join("remap.toml")).unwrap();
    let err = Remapper::new(config).unwrap().run().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    // nothing written for the file that did exist either
    assert_eq!(
        fs::read_to_string(dir.path().join("src/net/minecraft/server/Block.java")).unwrap(),
        BLOCK
    );
}

#[test]
fn test_occupied_destination_refused_before_any_write() {
    let dir = setup_tree();
    let occupant = "package net.minecraft.world;\n\npublic class World {}\n";
    write(dir.path(), "src/net/minecraft/world/World.java", occupant);

    let config = RemapConfig::load(dir.path().join("remap.toml")).unwrap();
    let err = Remapper::new(config).unwrap().run().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConsistencyViolation);
    assert!(err.to_string().contains("World.java"));

    let src = dir.path().join("src");
    for (file, original) in [
        ("net/minecraft/server/Block.java", BLOCK),
        ("net/minecraft/server/World.java", WORLD),
        ("org/bukkit/craftbukkit/CraftBlock.java", CRAFT_BLOCK),
        ("net/minecraft/world/World.java", occupant),
    ] {
        assert_eq!(fs::read_to_string(src.join(file)).unwrap(), original, "{file}");
    }
    assert!(!src.join("net/minecraft/block").exists());
}

/// Tokens `f0 f1 ...` separated by `sep`, each a distinct field of `x/C`.
fn field_source(count: usize, sep: &str) -> String {
    (0..count)
        .map(|i| format!("f{i}"))
        .collect::<Vec<_>>()
        .join(sep)
}

proptest! {
    #[test]
    fn prop_cascading_offsets(
        names in prop::collection::vec("[a-zA-Z_][a-zA-Z0-9_]{0,11}", 1..24),
        sep in "[ ;.,(){}\n]{1,3}",
    ) {
        let source = field_source(names.len(), &sep);
        let mut lines = Vec::new();
        let mut tables = RenameTables::new();
        let mut offset = 0;
        for (i, name) in names.iter().enumerate() {
            let token = format!("f{i}");
            lines.push(format!(
                "@|Main.java|{offset}|{}|{token}|field|x.C|{token}",
                offset + token.len()
            ));
            tables.insert(SymbolKey::field("x/C", token.as_str()), name.as_str());
            offset += token.len() + sep.len();
        }

        let ranges = RangeMap::parse_str(&lines.join("\n"), &SourceRoot::lexical("/src")).unwrap();
        let corrections = Corrections::default();
        let remapped = FileRemapper::new(&tables, &corrections, "x")
            .remap("Main.java", &source, ranges.get("Main.java").unwrap())
            .unwrap();

        prop_assert_eq!(remapped.content, names.join(sep.as_str()));
        prop_assert_eq!(remapped.renamed, names.len());
    }
}
