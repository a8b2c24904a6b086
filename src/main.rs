use std::io::stdin;

use big_inters::service::gameapi::{client::load_api_key, queues::QueueCatalog};

mod ui;

fn main() {
    env_logger::init();

    match load_api_key() {
        Ok(api_key) => {
            let catalog = QueueCatalog::load();
            match ui::repl::run(api_key, &catalog) {
                Ok(_) => return,
                Err(error) => println!("Error occured while running console:\n{}\n", error),
            }
        }
        Err(error) => println!("Error occured while initializing:\n{}\n", error),
    };

    let mut s = String::new();
    println!("Press Enter to exit");
    let _ = stdin().read_line(&mut s);
}
