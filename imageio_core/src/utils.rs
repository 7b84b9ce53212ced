use colour::red;

pub fn print_intro() {
    println!(
        r#"
    _                                _
   (_)___ ___  ____ _____ ____  (_)___
  / / __ `__ \/ __ `/ __ `/ _ \/ / __ \
 / / / / / / / /_/ / /_/ /  __/ / /_/ /
/_/_/ /_/ /_/\__,_/\__, /\___/_/\____/
                  /____/               "#
    );

    if cfg!(debug_assertions) {
        red!("\nWARNING: YOU ARE RUNNING IN DEBUG MODE. Decoding large images is way slower than it should be.\n\n");
    }
}
