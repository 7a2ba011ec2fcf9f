// Shorthand for return Err(Error::new(ErrorKind::Foo))
//
// Usage:
// - err!(Variant)          -> return Err(Error::new(ErrorKind::Variant))
// - err!(Variant(Message)) -> return Err(Error::new(ErrorKind::Variant(Message)))
macro_rules! err {
	($variant:ident) => {
		return Err(crate::error::Error::new(crate::error::ErrorKind::$variant))
	};
	($variant:ident($reason:expr)) => {
		return Err(crate::error::Error::new(crate::error::ErrorKind::$variant(
			$reason,
		)))
	};
}

pub(crate) use err;
