//! CLI for s2-tiles - Print one lazily split tile from a GeoJSON-like file
//!
//! This is a thin wrapper around the s2-tiles-core library.

use anyhow::{bail, Context, Result};
use clap::Parser;
use s2_tiles_core::wm::{lon_lat_to_tile, tile_id};
use s2_tiles_core::{JsonCollection, Projection, S2CellId, TileStore, TileStoreOptions};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "s2-tiles",
    about = "Cut one S2 or Web-Mercator tile out of a GeoJSON-like file",
    version
)]
struct Args {
    /// Input JSON file (Feature, FeatureCollection, S2Feature or S2FeatureCollection)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Zoom level of the tile to print
    #[arg(long)]
    zoom: Option<u8>,

    /// Tile column (WM) or cell i (S2) at the given zoom
    #[arg(long, requires = "y")]
    x: Option<u32>,

    /// Tile row (WM) or cell j (S2) at the given zoom
    #[arg(long, requires = "x")]
    y: Option<u32>,

    /// Longitude inside the wanted tile
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Latitude inside the wanted tile
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Cube face for S2 x/y lookups
    #[arg(long, default_value = "0")]
    face: u8,

    /// S2 cell in `face/quadrants` form, e.g. 4/0123 (overrides zoom/x/y/lon/lat)
    #[arg(long)]
    cell: Option<String>,

    /// Projection to tile on (wm or s2), inferred from the input when omitted
    #[arg(long)]
    projection: Option<Projection>,

    /// JSON options document (camelCase TileStoreOptions); flags below override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Deepest zoom to preserve detail on
    #[arg(long)]
    max_zoom: Option<u8>,

    /// Depth of the up-front split
    #[arg(long)]
    index_max_zoom: Option<u8>,

    /// Simplification tolerance in tile pixels
    #[arg(long)]
    tolerance: Option<f64>,

    /// Clip buffer as a fraction of the tile width
    #[arg(long)]
    buffer: Option<f64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn options(&self) -> Result<TileStoreOptions> {
        let mut options = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("Invalid options in {}", path.display()))?
            }
            None => TileStoreOptions::default(),
        };

        if let Some(projection) = self.projection {
            options = options.with_projection(projection);
        }
        if let Some(max_zoom) = self.max_zoom {
            options = options.with_maxzoom(max_zoom);
        }
        if let Some(index_max_zoom) = self.index_max_zoom {
            options = options.with_index_maxzoom(index_max_zoom);
        }
        if let Some(tolerance) = self.tolerance {
            options = options.with_tolerance(tolerance);
        }
        if let Some(buffer) = self.buffer {
            options = options.with_buffer(buffer);
        }
        Ok(options)
    }

    /// Resolve the requested tile id for `projection`
    fn tile_id(&self, projection: Projection) -> Result<u64> {
        if let Some(cell) = &self.cell {
            if projection != Projection::S2 {
                bail!("--cell only applies to the S2 projection");
            }
            let cell: S2CellId = cell.parse().context("Failed to parse --cell")?;
            return Ok(cell.id());
        }

        let Some(zoom) = self.zoom else {
            bail!("--zoom is required unless --cell is given");
        };

        match (projection, self.x.zip(self.y), self.lon.zip(self.lat)) {
            (Projection::WebMercator, Some((x, y)), _) => Ok(tile_id::to_id(zoom, x, y)),
            (Projection::WebMercator, None, Some((lon, lat))) => {
                Ok(lon_lat_to_tile(lon, lat, zoom).id())
            }
            (Projection::S2, Some((i, j)), _) => {
                Ok(S2CellId::from_face_ij(self.face, i, j, Some(zoom)).id())
            }
            (Projection::S2, None, Some((lon, lat))) => {
                Ok(S2CellId::from_lon_lat(lon, lat).parent(Some(zoom)).id())
            }
            (_, None, None) => bail!("Either --x/--y or --lon/--lat is required"),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let data: JsonCollection = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;

    let options = args.options()?;
    let mut store = TileStore::new(data, options).context("Failed to build tile store")?;
    let id = args.tile_id(store.projection())?;
    log::info!(
        "Built {} store over faces {:?}, looking up tile {}",
        store.projection(),
        store.faces(),
        id
    );

    match store.get_tile(id) {
        Some(tile) => {
            let json = serde_json::to_string_pretty(tile).context("Failed to serialize tile")?;
            println!("{}", json);
        }
        None => println!("No data in tile {}", id),
    }

    Ok(())
}
