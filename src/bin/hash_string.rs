use std::env;
use xxdigest::Backend;

fn main() {
    println!("backend: {}", Backend::detect());

    for arg in env::args().skip(1) {
        let h64 = xxdigest::hash64(0, arg.as_bytes());
        let h128 = xxdigest::hash128(0, arg.as_bytes());

        println!("{h64:016x}   {h128}   {arg}");
    }
}
