use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");

    let crate_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo");
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("CARANGAS_H")
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(out_dir.join("carangas.h"));
        }
        Err(e) => println!("cargo:warning=header generation skipped: {e}"),
    }
}
