//! The optional `main.lua` entry point of a compiled mod.

use crate::compiler::CompileOptions;
use crate::lua::{lua_string, LuaWriter};

/// Sprite size of one atlas cell, in pixels.
const SPRITE_WIDTH: u32 = 71;
const SPRITE_HEIGHT: u32 = 95;

/// Register the atlas, then load each generated file in the given order.
pub(crate) fn render_loader(options: &CompileOptions, paths: &[String]) -> String {
    let atlas = options.atlas_name();
    let mut w = LuaWriter::new();
    w.open("SMODS.Atlas({");
    w.line(&format!("key = {},", lua_string(atlas)));
    w.line(&format!("path = {},", lua_string(&format!("{atlas}.png"))));
    w.line(&format!("px = {SPRITE_WIDTH},"));
    w.line(&format!("py = {SPRITE_HEIGHT},"));
    w.close("})");
    if !paths.is_empty() {
        w.blank();
    }
    for path in paths {
        w.line(&format!("assert(SMODS.load_file({}))()", lua_string(path)));
    }
    w.finish()
}
