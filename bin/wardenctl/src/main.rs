use wardenctl::run;

fn main() {
    let result = run();
    let error = match result {
        Err(error) => error,
        Ok(0) => return,
        Ok(num) => std::process::exit(num),
    };

    // Provide better error messages for cases where we can provide suggestions to the user.
    if let Some(warden_conf::Error::PathNotFound(path)) = error.downcast_ref() {
        eprintln!("Configuration file not found at '{}'", path);
        eprintln!("Create the file or select a different one with '--config <PATH>'");
        std::process::exit(1);
    }
    if let Some(error) = error.downcast_ref::<wardenctl::BackendNotFound>() {
        eprintln!("{}", error);
        eprintln!("Supported persistent store backends are: sqlite");
        std::process::exit(1);
    }

    // Print the error in detailed format for all other cases.
    eprintln!("{:?}", error);
    std::process::exit(1);
}
