//! End-to-end runs through `Generator::generate`.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Map, Value, json};
use voxgen_config::{Band, BiomeConf, CallSpec, GeneratorConfig, Preset, UnknownCallPolicy};
use voxgen_terrain::{
    BUILD_CHUNKS, BackendError, BackendPair, BiomeMask, CallTrace, Fbm, GenerateError,
    Generator, HeightField, NoiseBackend, PostProcessError, PostProcessRegistry, SequentialBackend,
    UNKNOWN_CALL,
};
use voxgen_voxel::{BlockId, ChunkDims, ChunkOrigin, ChunkStore, WATER_COLOR};

fn biome(id: &str, width: f64, base: u32, amp: u32, freq: f64, color: [u8; 3]) -> BiomeConf {
    BiomeConf {
        id: id.into(),
        band: Band::Temperate,
        width,
        base,
        amp,
        freq,
        color,
    }
}

fn flat_preset(sea_level: u32) -> Preset {
    Preset {
        world_size: 4,
        sea_level,
        macro_seed: 1,
        height_seed: 2,
        biomes: vec![biome("flat", 1.0, 2, 0, 0.1, [10, 20, 30])],
        calls: Vec::new(),
    }
}

fn varied_preset() -> Preset {
    Preset {
        world_size: 40,
        sea_level: 18,
        macro_seed: 2024,
        height_seed: 99,
        biomes: vec![
            biome("ocean", 0.3, 4, 10, 0.08, [0, 40, 120]),
            biome("plains", 0.5, 14, 8, 0.05, [80, 160, 60]),
            biome("peaks", 0.2, 20, 25, 0.12, [200, 200, 210]),
        ],
        calls: Vec::new(),
    }
}

fn config(out: &Path, chunk_size: u32) -> GeneratorConfig {
    GeneratorConfig {
        output_dir: out.to_path_buf(),
        chunk_size,
        worker_threads: 2,
        ..GeneratorConfig::default()
    }
}

fn call(name: &str, args: Value) -> CallSpec {
    let args = match args {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    CallSpec {
        name: name.into(),
        args,
    }
}

#[test]
fn test_flat_world_without_sea() {
    let dir = tempfile::tempdir().unwrap();
    let registry = PostProcessRegistry::new();
    let generator = Generator::new(&config(dir.path(), 128), &registry);
    generator.generate(&flat_preset(0), "flat").unwrap();

    let store = ChunkStore::open(dir.path()).unwrap();
    let dims = ChunkDims::new(4, 3, 4);
    let blocks = store.read_chunk(ChunkOrigin::new(0, 0), dims).unwrap();
    let colors = store.read_colors(ChunkOrigin::new(0, 0), dims).unwrap();

    for x in 0..4 {
        for z in 0..4 {
            for y in 0..3 {
                let expected = if y < 2 { BlockId(1) } else { BlockId::AIR };
                assert_eq!(blocks.get(x, y, z), expected, "block at ({x}, {y}, {z})");
                assert_eq!(colors.get(x, y, z), [10, 20, 30], "color at ({x}, {y}, {z})");
            }
        }
    }
}

#[test]
fn test_flat_world_with_sea_fills_above_terrain() {
    let dir = tempfile::tempdir().unwrap();
    let registry = PostProcessRegistry::new();
    let generator = Generator::new(&config(dir.path(), 128), &registry);
    generator.generate(&flat_preset(3), "sea").unwrap();

    let store = ChunkStore::open(dir.path()).unwrap();
    let dims = ChunkDims::new(4, 3, 4);
    let blocks = store.read_chunk(ChunkOrigin::new(0, 0), dims).unwrap();
    let colors = store.read_colors(ChunkOrigin::new(0, 0), dims).unwrap();

    for x in 0..4 {
        for z in 0..4 {
            assert_eq!(blocks.get(x, 0, z), BlockId(1));
            assert_eq!(blocks.get(x, 1, z), BlockId(1));
            assert_eq!(blocks.get(x, 2, z), BlockId::WATER);
            assert_eq!(colors.get(x, 1, z), [10, 20, 30]);
            assert_eq!(colors.get(x, 2, z), WATER_COLOR);
        }
    }
}

#[test]
fn test_runs_are_deterministic() {
    let preset = varied_preset();
    let registry = PostProcessRegistry::new();
    let mut outputs = Vec::new();

    for _ in 0..2 {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path(), 16);
        cfg.prefer_parallel = false;
        let trace_path = Generator::new(&cfg, &registry)
            .generate(&preset, "det")
            .unwrap();

        let trace = CallTrace::load(&trace_path).unwrap();
        let chunk_paths = trace.entries()[0].args["chunk_paths"].as_array().unwrap().clone();
        let color_paths = trace.entries()[0].args["color_paths"].as_array().unwrap().clone();
        let bytes: Vec<Vec<u8>> = chunk_paths
            .iter()
            .chain(&color_paths)
            .map(|p| std::fs::read(p.as_str().unwrap()).unwrap())
            .collect();
        outputs.push(bytes);
    }

    assert_eq!(outputs[0].len(), 18, "9 chunks, each with a color file");
    assert_eq!(outputs[0], outputs[1], "identical inputs must give identical files");
}

#[test]
fn test_chunks_match_height_field_and_tile_world() {
    let preset = varied_preset();
    let dir = tempfile::tempdir().unwrap();
    let registry = PostProcessRegistry::new();
    let mut cfg = config(dir.path(), 16);
    cfg.prefer_parallel = false;
    Generator::new(&cfg, &registry).generate(&preset, "tile").unwrap();

    let mask = BiomeMask::build(&preset);
    let heights = HeightField::build(&preset, &mask, &BackendPair::sequential_only()).unwrap();
    let max_height = heights.max_height();
    let store = ChunkStore::open(dir.path()).unwrap();

    let mut covered = vec![false; 40 * 40];
    for cx in [0u32, 16, 32] {
        for cz in [0u32, 16, 32] {
            let x_len = 16.min(40 - cx as usize);
            let z_len = 16.min(40 - cz as usize);
            let dims = ChunkDims::new(x_len, max_height, z_len);
            let origin = ChunkOrigin::new(cx, cz);
            let blocks = store.read_chunk(origin, dims).unwrap();
            let colors = store.read_colors(origin, dims).unwrap();

            for lx in 0..x_len {
                for lz in 0..z_len {
                    let (x, z) = (cx as usize + lx, cz as usize + lz);
                    assert!(!covered[x * 40 + z], "column ({x}, {z}) in two chunks");
                    covered[x * 40 + z] = true;

                    let h = heights.get(x, z) as usize;
                    let index = mask.get(x, z);
                    for y in 0..max_height {
                        let water = h <= y && y < preset.sea_level as usize;
                        let block = blocks.get(lx, y, lz);
                        if y < h {
                            assert_eq!(block, BlockId(1 + index as u8));
                        } else if water {
                            assert_eq!(block, BlockId::WATER);
                        } else {
                            assert!(block.is_air(), "expected air at ({x}, {y}, {z})");
                        }
                        let expected = if water {
                            WATER_COLOR
                        } else {
                            preset.biomes[index].color
                        };
                        assert_eq!(colors.get(lx, y, lz), expected);
                    }
                }
            }
        }
    }
    assert!(covered.iter().all(|&c| c), "every column belongs to a chunk");
}

#[test]
fn test_trace_file_shape() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = PostProcessRegistry::new();
    registry
        .register("smooth", json!({"type": "object"}), |_, _| Ok(()))
        .unwrap();
    let mut preset = flat_preset(0);
    preset.calls = vec![call("smooth", json!({"passes": 2}))];

    let trace_path = Generator::new(&config(dir.path(), 2), &registry)
        .generate(&preset, "shape")
        .unwrap();
    assert_eq!(trace_path, dir.path().join("traces").join("shape.trace.json"));

    let value: Value = serde_json::from_str(&std::fs::read_to_string(&trace_path).unwrap()).unwrap();
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["fn"], BUILD_CHUNKS);
    let args = &entries[0]["args"];
    assert_eq!(args["chunk_paths"].as_array().unwrap().len(), 4);
    assert_eq!(args["color_paths"].as_array().unwrap().len(), 4);
    assert_eq!(args["max_height"], 3);
    assert_eq!(args["chunk_size"], 2);
    assert!(
        args["color_paths"][0]
            .as_str()
            .unwrap()
            .ends_with("chunk_0_0_color.raw")
    );
    assert_eq!(entries[1], json!({"fn": "smooth", "args": {"passes": 2}}));
}

#[test]
fn test_registered_calls_run_in_order_with_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));
    let mut registry = PostProcessRegistry::new();
    for name in ["first", "second"] {
        let order = Arc::clone(&order);
        registry
            .register(name, json!({}), move |chunks, args| {
                assert_eq!(chunks.len(), 1);
                order.lock().unwrap().push((name, args.clone()));
                Ok(())
            })
            .unwrap();
    }
    let mut preset = flat_preset(0);
    preset.calls = vec![
        call("second", json!({"n": 1})),
        call("first", json!({})),
        call("second", json!({"n": 2})),
    ];

    let trace_path = Generator::new(&config(dir.path(), 128), &registry)
        .generate(&preset, "order")
        .unwrap();

    let seen: Vec<_> = order.lock().unwrap().iter().map(|(n, _)| *n).collect();
    assert_eq!(seen, ["second", "first", "second"]);
    let trace = CallTrace::load(&trace_path).unwrap();
    let names: Vec<_> = trace.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, [BUILD_CHUNKS, "second", "first", "second"]);
    assert_eq!(trace.entries()[3].args["n"], 2);
}

#[test]
fn test_unknown_call_warns_and_records() {
    let dir = tempfile::tempdir().unwrap();
    let registry = PostProcessRegistry::new();
    let mut preset = flat_preset(0);
    preset.calls = vec![call("carve_cave", json!({"seed": 3}))];

    let trace_path = Generator::new(&config(dir.path(), 128), &registry)
        .generate(&preset, "warn")
        .unwrap();
    let trace = CallTrace::load(&trace_path).unwrap();
    assert_eq!(trace.len(), 2);
    assert_eq!(trace.entries()[1].name, UNKNOWN_CALL);
    assert_eq!(
        Value::Object(trace.entries()[1].args.clone()),
        json!({"name": "carve_cave", "args": {"seed": 3}})
    );
}

#[test]
fn test_unknown_call_fails_before_any_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let registry = PostProcessRegistry::new();
    let mut cfg = config(&out, 128);
    cfg.unknown_calls = UnknownCallPolicy::Fail;
    let mut preset = flat_preset(0);
    preset.calls = vec![call("carve_cave", json!({}))];

    let err = Generator::new(&cfg, &registry)
        .generate(&preset, "fail")
        .unwrap_err();
    assert!(
        matches!(err, GenerateError::UnknownCall { index: 0, ref name } if name == "carve_cave"),
        "got {err:?}"
    );
    assert!(!out.exists(), "nothing should be written for a rejected run");
}

#[test]
fn test_failing_step_aborts_without_trace() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = PostProcessRegistry::new();
    registry
        .register("broken", json!({}), |_, _| {
            Err(PostProcessError::Failed("boom".into()))
        })
        .unwrap();
    let mut preset = flat_preset(0);
    preset.calls = vec![call("broken", json!({}))];

    let err = Generator::new(&config(dir.path(), 128), &registry)
        .generate(&preset, "broken")
        .unwrap_err();
    assert!(matches!(err, GenerateError::PostProcess { ref name, .. } if name == "broken"));
    assert!(!dir.path().join("traces").join("broken.trace.json").exists());
}

#[test]
fn test_invalid_inputs_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let registry = PostProcessRegistry::new();
    let generator = Generator::new(&config(dir.path(), 128), &registry);

    for bad in ["", ".", "..", "a/b"] {
        assert!(matches!(
            generator.generate(&flat_preset(0), bad),
            Err(GenerateError::InvalidRunId(_))
        ));
    }

    let mut preset = flat_preset(0);
    preset.biomes.clear();
    assert!(matches!(
        generator.generate(&preset, "empty"),
        Err(GenerateError::Preset(_))
    ));

    let zero = Generator::new(&config(dir.path(), 0), &registry);
    assert!(matches!(
        zero.generate(&flat_preset(0), "zero"),
        Err(GenerateError::InvalidChunkSize)
    ));
}

struct BrokenDevice {
    attempts: Arc<AtomicUsize>,
}

impl NoiseBackend for BrokenDevice {
    fn name(&self) -> &'static str {
        "broken-device"
    }

    fn fbm_normalized(&self, _: &Fbm, _: &[(u32, u32)]) -> Result<Vec<f64>, BackendError> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        Err(BackendError::Unavailable("device lost".into()))
    }
}

#[test]
fn test_backend_failure_falls_back_transparently() {
    let preset = varied_preset();
    let registry = PostProcessRegistry::new();

    let reference_dir = tempfile::tempdir().unwrap();
    let mut cfg = config(reference_dir.path(), 64);
    cfg.prefer_parallel = false;
    Generator::new(&cfg, &registry).generate(&preset, "ref").unwrap();

    let attempts = Arc::new(AtomicUsize::new(0));
    let fallback_dir = tempfile::tempdir().unwrap();
    let generator = Generator::new(&config(fallback_dir.path(), 64), &registry).with_backends(
        BackendPair::new(
            Box::new(BrokenDevice {
                attempts: Arc::clone(&attempts),
            }),
            Box::new(SequentialBackend),
        ),
    );
    generator.generate(&preset, "fallback").unwrap();

    assert_eq!(attempts.load(Ordering::Relaxed), 3, "one attempt per biome");
    let name = Path::new("chunks").join("chunk_0_0.raw");
    assert_eq!(
        std::fs::read(reference_dir.path().join(&name)).unwrap(),
        std::fs::read(fallback_dir.path().join(&name)).unwrap()
    );
}
