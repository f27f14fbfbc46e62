//! Build script for numr-lrn
//!
//! With the `cuda` feature, compiles `src/runtime/cuda/kernels/lrn.cu` to
//! PTX in `OUT_DIR` and exports that directory as `CUDA_KERNEL_DIR`.
//!
//! Needs nvcc from a CUDA Toolkit that targets sm_75 (Turing) or newer. Set
//! `CUDA_PATH` when the toolkit is not under one of the usual prefixes.

fn main() {
    #[cfg(feature = "cuda")]
    cuda::build();
}

#[cfg(feature = "cuda")]
mod cuda {
    use std::env;
    use std::path::{Path, PathBuf};
    use std::process::Command;

    const KERNEL_SRC_DIR: &str = "src/runtime/cuda/kernels";
    const KERNELS: &[&str] = &["lrn"];
    const ARCH: &str = "sm_75";

    const NVCC_PREFIXES: &[&str] = &[
        "/usr/local/cuda",
        "/usr/local/cuda-12",
        "/usr/local/cuda-11",
        "/opt/cuda",
    ];

    pub fn build() {
        if let Err(msg) = compile_kernels() {
            panic!("building CUDA kernels failed: {msg}");
        }
    }

    fn compile_kernels() -> Result<(), String> {
        println!("cargo:rerun-if-env-changed=CUDA_PATH");

        let out_dir = PathBuf::from(env::var("OUT_DIR").map_err(|e| format!("OUT_DIR: {e}"))?);
        let nvcc = find_nvcc().ok_or_else(|| {
            "nvcc not found; install the CUDA Toolkit and put nvcc on PATH \
             or point CUDA_PATH at the installation (e.g. /usr/local/cuda)"
                .to_string()
        })?;

        for name in KERNELS {
            let src = Path::new(KERNEL_SRC_DIR).join(format!("{name}.cu"));
            let ptx = out_dir.join(format!("{name}.ptx"));
            println!("cargo:rerun-if-changed={}", src.display());

            if !src.exists() {
                return Err(format!("kernel source {} is missing", src.display()));
            }

            let output = Command::new(&nvcc)
                .args(["-ptx", "-O3", &format!("-arch={ARCH}"), "-o"])
                .arg(&ptx)
                .arg(&src)
                .output()
                .map_err(|e| format!("could not run {}: {e}", nvcc.display()))?;

            if !output.status.success() {
                return Err(format!(
                    "nvcc rejected {}:\n{}{}",
                    src.display(),
                    String::from_utf8_lossy(&output.stdout),
                    String::from_utf8_lossy(&output.stderr)
                ));
            }
        }

        println!("cargo:rustc-env=CUDA_KERNEL_DIR={}", out_dir.display());
        Ok(())
    }

    fn find_nvcc() -> Option<PathBuf> {
        let exe = if cfg!(windows) { "nvcc.exe" } else { "nvcc" };

        let from_env = env::var_os("CUDA_PATH").map(PathBuf::from);
        let prefixes = from_env
            .into_iter()
            .chain(NVCC_PREFIXES.iter().map(PathBuf::from));
        for prefix in prefixes {
            let candidate = prefix.join("bin").join(exe);
            if candidate.exists() {
                return Some(candidate);
            }
        }

        // Fall back to whatever is on PATH
        Command::new(exe)
            .arg("--version")
            .output()
            .ok()
            .filter(|o| o.status.success())
            .map(|_| PathBuf::from(exe))
    }
}
