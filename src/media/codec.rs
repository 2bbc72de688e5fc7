//! Codec descriptor and MIME rendering

/// Container type announced to the sink
pub const CONTAINER_MIME: &str = "video/mp4";

/// Per-track codec strings learned from the first segment of a stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodecDescriptor {
    codecs: Vec<String>,
}

impl CodecDescriptor {
    pub fn new(codecs: Vec<String>) -> Self {
        Self { codecs }
    }

    pub fn codecs(&self) -> &[String] {
        &self.codecs
    }

    /// Codec list joined the way the `codecs` MIME parameter expects
    pub fn codec_string(&self) -> String {
        self.codecs.join(", ")
    }

    /// MIME type for opening the sink track.
    ///
    /// A non-`None` `override_codecs` replaces the discovered codec list verbatim.
    pub fn mime(&self, override_codecs: Option<&str>) -> String {
        let codecs = match override_codecs {
            Some(codecs) => codecs.to_string(),
            None => self.codec_string(),
        };
        format!("{}; codecs=\"{}\"", CONTAINER_MIME, codecs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_joins_tracks() {
        let desc = CodecDescriptor::new(vec!["avc1.64001f".into(), "mp4a.40.2".into()]);
        assert_eq!(desc.mime(None), "video/mp4; codecs=\"avc1.64001f, mp4a.40.2\"");
    }

    #[test]
    fn test_mime_override() {
        let desc = CodecDescriptor::new(vec!["avc1.64001f".into()]);
        assert_eq!(
            desc.mime(Some("avc1.42e01e")),
            "video/mp4; codecs=\"avc1.42e01e\""
        );
    }

    #[test]
    fn test_empty_descriptor() {
        let desc = CodecDescriptor::default();
        assert!(desc.codecs().is_empty());
        assert_eq!(desc.mime(None), "video/mp4; codecs=\"\"");
    }
}
