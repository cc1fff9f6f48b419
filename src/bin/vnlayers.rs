use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use vnlayers::{Kernels, Rect, Surface, Tier, VnOpts};

#[derive(Parser, Debug)]
#[command(name = "vnlayers", version)]
struct Cli {
    /// Options JSON (kernel tier ceiling, view defaults).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the detected CPU tier and the kernel bound for each operation.
    Probe(ProbeArgs),
    /// Check every available tier against the scalar kernels.
    Verify(VerifyArgs),
    /// Blend two images through a tiling mask.
    Wipe(WipeArgs),
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    /// Do not bind kernels above this tier.
    #[arg(long)]
    max_tier: Option<Tier>,

    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct VerifyArgs {
    /// Longest buffer to test.
    #[arg(long, default_value_t = 4099)]
    max_len: usize,
}

#[derive(Parser, Debug)]
struct WipeArgs {
    /// First source image (shown where the mask is above the threshold).
    #[arg(long)]
    a: PathBuf,

    /// Second source image.
    #[arg(long)]
    b: PathBuf,

    /// Mask image; its blue channel is compared to the threshold. Tiles across the output.
    /// Without one, every pixel mixes `b` in at `min(threshold, 255)`.
    #[arg(long)]
    mask: Option<PathBuf>,

    /// 0 shows only `a`; 510 shows only `b`.
    #[arg(long, default_value_t = 255)]
    threshold: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let opts = load_opts(cli.config.as_deref())?;
    match cli.cmd {
        Command::Probe(args) => cmd_probe(&opts, args),
        Command::Verify(args) => cmd_verify(args),
        Command::Wipe(args) => cmd_wipe(&opts, args),
    }
}

fn load_opts(path: Option<&Path>) -> anyhow::Result<VnOpts> {
    let mut opts = match path {
        Some(p) => VnOpts::from_path(p).with_context(|| format!("load config '{}'", p.display()))?,
        None => VnOpts::default(),
    };
    opts.apply_env().context("apply environment overrides")?;
    Ok(opts)
}

fn cmd_probe(opts: &VnOpts, args: ProbeArgs) -> anyhow::Result<()> {
    let detected = vnlayers::detect();
    let ceiling = args.max_tier.or(opts.kernels.max_tier);
    let kernels = Kernels::with_ceiling(ceiling);
    let b = kernels.bindings();

    if args.json {
        let report = serde_json::json!({
            "detected": detected,
            "ceiling": ceiling,
            "tier": kernels.tier(),
            "available": Kernels::available_tiers(),
            "bindings": b,
            "mask_min_width": kernels.mask_min_width(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("detected:   {detected}");
    if let Some(c) = ceiling {
        println!("ceiling:    {c}");
    }
    println!("tier:       {}", kernels.tier());
    println!("mean:       {}", b.mean);
    println!("accumulate: {}", b.accumulate);
    println!("subtract:   {}", b.subtract);
    println!("blend:      {}", b.blend);
    println!("mask_blend: {}", b.mask_blend);
    Ok(())
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn seam_lengths(max_len: usize) -> Vec<usize> {
    let mut lens = vec![0, 1];
    for w in [4usize, 8, 16] {
        lens.extend([w - 1, w, w + 1, 2 * w, 3 * w + 1]);
    }
    lens.extend([257, 1001, 4099]);
    lens.retain(|&n| n <= max_len);
    if !lens.contains(&max_len) {
        lens.push(max_len);
    }
    lens.sort_unstable();
    lens.dedup();
    lens
}

fn cmd_verify(args: VerifyArgs) -> anyhow::Result<()> {
    let basic = Kernels::basic();
    let lens = seam_lengths(args.max_len);
    let mut failures = 0usize;

    for tier in Kernels::available_tiers() {
        let Some(k) = Kernels::for_tier(tier) else {
            continue;
        };
        let mut seed = 0x5EED_u64 ^ (tier as u64);
        let mut tier_failures = 0usize;

        for &len in &lens {
            let a: Vec<u8> = (0..len).map(|_| splitmix64(&mut seed) as u8).collect();
            let b: Vec<u8> = (0..len).map(|_| splitmix64(&mut seed) as u8).collect();

            let (mut want, mut got) = (vec![0u8; len], vec![0u8; len]);
            basic.mean(&a, &b, &mut want)?;
            k.mean(&a, &b, &mut got)?;
            tier_failures += usize::from(want != got);

            let (mut want, mut got) = (a.clone(), a.clone());
            basic.accumulate(&mut want, &b)?;
            k.accumulate(&mut got, &b)?;
            tier_failures += usize::from(want != got);

            let (mut want, mut got) = (a.clone(), a.clone());
            basic.subtract(&mut want, &b)?;
            k.subtract(&mut got, &b)?;
            tier_failures += usize::from(want != got);

            let src: Vec<u32> = (0..len).map(|_| splitmix64(&mut seed) as u32).collect();
            let dst: Vec<u32> = (0..len).map(|_| splitmix64(&mut seed) as u32).collect();
            for alpha in [0u8, 1, 128, 254, 255] {
                let (mut want, mut got) = (dst.clone(), dst.clone());
                basic.blend(&mut want, &src, alpha)?;
                k.blend(&mut got, &src, alpha)?;
                tier_failures += usize::from(want != got);
            }
        }

        let w = 37;
        let h = 5;
        let noise = |seed: &mut u64, w: u32, h: u32| -> anyhow::Result<Surface> {
            let px = (0..w * h).map(|_| splitmix64(seed) as u32).collect();
            Ok(Surface::from_pixels(w, h, px)?)
        };
        let s1 = noise(&mut seed, w, h)?;
        let s2 = noise(&mut seed, w, h)?;
        let mask = noise(&mut seed, 8, 3)?;
        for threshold in [0u32, 128, 255, 400, 510] {
            let rect = Rect::new(1, 1, w - 2, h - 1);
            let (mut want, mut got) = (s1.clone(), s1.clone());
            basic.mask_blend(&mut want, &s1, &s2, &mask, rect, threshold);
            if k.mask_blend(&mut got, &s1, &s2, &mask, rect, threshold) {
                tier_failures += usize::from(want != got);
            }
        }

        let status = if tier_failures == 0 { "ok" } else { "MISMATCH" };
        println!("{tier:<8} {status} ({} lengths)", lens.len());
        failures += tier_failures;
    }

    if failures > 0 {
        anyhow::bail!("{failures} kernel mismatches against the scalar set");
    }
    Ok(())
}

fn read_png(path: &Path) -> anyhow::Result<Surface> {
    let img = image::open(path)
        .with_context(|| format!("read image '{}'", path.display()))?
        .to_rgba8();
    Ok(Surface::from_rgba_image(&img))
}

fn cmd_wipe(opts: &VnOpts, args: WipeArgs) -> anyhow::Result<()> {
    let a = read_png(&args.a)?;
    let b = read_png(&args.b)?;
    if a.size() != b.size() {
        anyhow::bail!(
            "source images differ in size: {}x{} vs {}x{}",
            a.width(),
            a.height(),
            b.width(),
            b.height()
        );
    }

    let kernels = Kernels::from_opts(&opts.kernels);
    let mut out = a.clone();
    let rect = out.bounds();
    match &args.mask {
        Some(path) => {
            let mask = read_png(path)?;
            if !kernels.mask_blend(&mut out, &a, &b, &mask, rect, args.threshold)
                && !Kernels::basic().mask_blend(&mut out, &a, &b, &mask, rect, args.threshold)
            {
                anyhow::bail!("mask image '{}' is empty", path.display());
            }
        }
        None => kernels.mask_blend_const(&mut out, &a, &b, rect, args.threshold),
    }

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    out.to_rgba_image()
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
