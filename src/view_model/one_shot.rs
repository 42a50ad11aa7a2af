use std::sync::Mutex;

/// A value that is handed out at most once, no matter how many observers
/// see it. Used for transient messages such as error banners.
#[derive(Debug)]
pub struct OneShot<T> {
  content: Mutex<Option<T>>,
}

impl<T> OneShot<T> {
  pub fn new(content: T) -> Self {
    Self {
      content: Mutex::new(Some(content)),
    }
  }

  /// Take the content if nobody has yet.
  pub fn take(&self) -> Option<T> {
    self.content.lock().ok()?.take()
  }

  #[cfg(test)]
  pub fn is_handled(&self) -> bool {
    self
      .content
      .lock()
      .map(|content| content.is_none())
      .unwrap_or(true)
  }
}

#[cfg(test)]
impl<T: Clone> OneShot<T> {
  /// Look at the content without consuming it.
  pub fn peek(&self) -> Option<T> {
    self.content.lock().ok()?.clone()
  }
}
