use std::fs::File;

use myfs::structs::{Block, Inode, Superblock};
use myfs::{verify, Layout};

fn prompt(separator: &str) -> Option<Vec<String>> {
    use std::io::Write;
    let mut line = String::new();
    print!("{separator}");
    std::io::stdout().flush().ok()?;
    match std::io::stdin().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.split_whitespace().map(str::to_string).collect()),
    }
}

fn execute(cmd: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut dev = File::open(args.first().map(String::as_str).unwrap_or("myfs"))?;
    if cmd.is_empty() {
        return Ok(());
    }
    let superblock = Superblock::load(&mut dev)?;
    let layout = Layout::from_superblock(&superblock)?;
    match cmd[0].as_str() {
        "s" => println!["{superblock}"],
        "l" => println!["{layout}"],
        "i" => {
            if cmd.len() == 2 {
                println!["{}", Inode::load(&mut dev, &layout, cmd[1].parse()?)?];
            } else {
                for index in 0..layout.inode_count {
                    println!["{}", Inode::load(&mut dev, &layout, index)?];
                }
            }
        }
        "b" if cmd.len() == 2 => {
            println!["{}", Block::load(&mut dev, &layout, cmd[1].parse()?)?];
        }
        "v" => {
            verify(&mut dev)?;
            println!["ok"];
        }
        _ => println!["commands: s, l, i [index], b <index>, v, q"],
    }
    Ok(())
}

fn main() {
    env_logger::init();
    while let Some(cmd) = prompt(">> ") {
        if cmd.first().map(String::as_str) == Some("q") {
            break;
        }
        if let Err(e) = execute(&cmd) {
            eprintln!("{e}");
        }
    }
}
