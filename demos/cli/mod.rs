use std::env;
use std::process;

pub fn usage_and_exit(usage: &str) -> ! {
    eprintln!("{usage}");
    process::exit(1);
}

pub struct ArgParser {
    args: Vec<String>,
    usage: &'static str,
}

impl ArgParser {
    pub fn new(usage: &'static str) -> Self {
        let args: Vec<String> = env::args().skip(1).collect();

        if args.iter().any(|a| a == "--help" || a == "-h") {
            println!("{usage}");
            process::exit(0);
        }

        Self { args, usage }
    }

    pub fn take_value(&mut self, names: &[&str]) -> Option<String> {
        let i = self.args.iter().position(|a| names.contains(&a.as_str()))?;
        if i + 1 >= self.args.len() {
            usage_and_exit(self.usage);
        }
        let value = self.args.remove(i + 1);
        self.args.remove(i);
        Some(value)
    }

    /// Every value given for a repeatable flag, in order.
    pub fn take_all(&mut self, names: &[&str]) -> Vec<String> {
        let mut values = Vec::new();
        while let Some(value) = self.take_value(names) {
            values.push(value);
        }
        values
    }

    pub fn remaining(self) -> Vec<String> {
        self.args
    }
}
