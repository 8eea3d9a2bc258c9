use memokit::prelude::*;

fn fetch(args: &Args) -> Result<String, String> {
    match args.positional() {
        [ArgValue::Str(url)] => Ok(format!("<html>{url}</html>")),
        other => Err(format!("expected one url, got {} arguments", other.len())),
    }
}

fn main() {
    let fetch_url = Memoized::new(fetch, StoreConfig::new(2, CachePolicy::RecencySingle))
        .expect("capacity 2 is valid");

    for url in ["a.com", "a.com", "b.com", "b.com", "a.com", "c.com"] {
        let misses = fetch_url.cache().misses();
        let body = fetch_url.call(&Args::new().arg(url)).expect("fetch succeeds");
        let outcome = if fetch_url.cache().misses() > misses { "miss" } else { "hit" };
        println!("{outcome}: {body}");
    }

    let b_cached = fetch_url.cache().contains(&Args::new().arg("b.com")).expect("hashable");
    println!("contains b.com? {b_cached}");

    let metrics = fetch_url.cache().metrics();
    println!("hits={} misses={} evictions={}", metrics.hits, metrics.misses, metrics.evictions);
}

// Expected output:
// miss: <html>a.com</html>
// hit: <html>a.com</html>
// miss: <html>b.com</html>
// hit: <html>b.com</html>
// hit: <html>a.com</html>
// miss: <html>c.com</html>
// contains b.com? false
// hits=3 misses=3 evictions=1
//
// Explanation: capacity=2; the third call to a.com makes b.com the least
// recently used entry, so inserting c.com evicts b.com.
