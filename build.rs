use std::{env, path::Path};

// ffmpeg-sys-next locates FFmpeg through FFMPEG_DIR or pkg-config. On
// Windows neither is usually set up, so point at a vcpkg install when one
// can be found.
fn main() {
    for variable in ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_TRIPLET"] {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows")
        || env::var_os("FFMPEG_DIR").is_some()
    {
        return;
    }

    let Some(vcpkg_root) = env::var_os("VCPKG_ROOT") else {
        println!("cargo:warning=scenegrab needs FFmpeg; set FFMPEG_DIR to an FFmpeg install");
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| String::from("x64-windows"));
    let candidate = Path::new(&vcpkg_root).join("installed").join(triplet);

    if candidate.join("include").join("libavcodec").is_dir() {
        println!(
            "cargo:warning=FFMPEG_DIR is unset; found vcpkg FFmpeg at {}",
            candidate.display()
        );
    } else {
        println!(
            "cargo:warning=no FFmpeg under {}; install it with `vcpkg install ffmpeg`",
            candidate.display()
        );
    }
}
