use std::io::{self, BufRead, Write};

/// Line-oriented user interaction. `None` means the input has ended.
pub trait Terminal {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Read a value that should not be echoed, such as a PIN.
    fn read_secret(&mut self, prompt: &str) -> io::Result<Option<String>>;

    fn say(&mut self, message: &str) -> io::Result<()>;
}

/// Terminal backed by the process's stdin and stdout.
pub struct Console {
    /// Echo secrets instead of hiding them (for piped input)
    plain_secrets: bool,
}

impl Console {
    pub fn new() -> Self {
        Self {
            plain_secrets: false,
        }
    }

    pub fn with_plain_secrets(mut self, plain: bool) -> Self {
        self.plain_secrets = plain;
        self
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for Console {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut buffer = String::new();
        if io::stdin().lock().read_line(&mut buffer)? == 0 {
            return Ok(None);
        }
        Ok(Some(buffer.trim().to_owned()))
    }

    fn read_secret(&mut self, prompt: &str) -> io::Result<Option<String>> {
        if self.plain_secrets {
            return self.read_line(prompt);
        }
        match rpassword::prompt_password(prompt) {
            Ok(secret) => Ok(Some(secret.trim().to_owned())),
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn say(&mut self, message: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        writeln!(stdout, "{}", message)?;
        stdout.flush()
    }
}
