//! Stamps the build date into the binary. The configuration store appends
//! it as a human-readable trailer when it (re)creates `config.ini`.

fn main() {
    let build_date = chrono::Local::now().format("%b %d %Y").to_string();
    println!("cargo:rustc-env=LOGCOM_BUILD_DATE={}", build_date);
}
