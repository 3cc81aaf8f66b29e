//! Debug overlay: tile border, corner and center markers, coordinates and
//! per-layer feature counts. Drawn over whatever the tile already shows,
//! including after a failed fetch (a blank tile with a border is a useful
//! signal).

use std::sync::PoisonError;

use crate::layer::style::Style;
use crate::tile::TileContext;

const MARKER: f64 = 5.0;
const CENTER_MARKER: f64 = 10.0;
const TEXT_X: f64 = 10.0;
const TEXT_Y: f64 = 20.0;
const TEXT_STEP: f64 = 15.0;

fn debug_style() -> Style {
    Style {
        fill_style: Some("#FFFF00".to_string()),
        stroke_style: Some("#000000".to_string()),
        line_width: Some(1.0),
        radius: None,
        selected: None,
    }
}

pub(crate) fn draw_debug_info(ctx: &TileContext) {
    let size = f64::from(ctx.tile_size);
    let mut surface = ctx
        .surface
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    surface.apply_style(&debug_style());
    surface.stroke_rect(0.0, 0.0, size, size);
    surface.fill_rect(0.0, 0.0, MARKER, MARKER);
    surface.fill_rect(0.0, size - MARKER, MARKER, MARKER);
    surface.fill_rect(size - MARKER, 0.0, MARKER, MARKER);
    surface.fill_rect(size - MARKER, size - MARKER, MARKER, MARKER);
    surface.fill_rect(
        size / 2.0 - MARKER,
        size / 2.0 - MARKER,
        CENTER_MARKER,
        CENTER_MARKER,
    );
    surface.stroke_text(
        &format!("Z: {} X: {} Y: {}", ctx.zoom, ctx.id.x, ctx.id.y),
        TEXT_X,
        TEXT_Y,
    );

    if let Some(decoded) = &ctx.decoded {
        let names = decoded.layer_names();
        surface.stroke_text(&format!("Layers: {}", names.len()), TEXT_X, TEXT_Y + TEXT_STEP);
        for (index, name) in names.iter().enumerate() {
            let count = decoded.layer(name).map(|layer| layer.len()).unwrap_or(0);
            let y = TEXT_Y + TEXT_STEP + (index as f64 + 1.0) * TEXT_STEP;
            surface.stroke_text(&format!("{name}: {count}"), TEXT_X, y);
        }
    }
}
