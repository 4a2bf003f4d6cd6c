use linkwatch_core::iw;

pub fn run() {
    if let Err(e) = iw::check_prerequisites() {
        super::exit_startup(e);
    }
    match iw::wireless_interfaces() {
        Ok(list) if list.is_empty() => {
            println!("No wireless interfaces found.");
            std::process::exit(1);
        }
        Ok(list) => {
            println!("Found {} wireless interface(s):\n", list.len());
            for iface in list {
                println!("  {iface}");
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
