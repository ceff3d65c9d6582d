const GIB: f64 = (1u64 << 30) as f64;

/// Running usage totals across every subscription folded into one response.
///
/// Sums only grow; the expiry and remaining-quota fields only tighten toward
/// the worst case. Non-positive remaining values are treated as unknown, not
/// as zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageSummary {
    pub upload: u64,
    pub download: u64,
    pub total: u64,
    pub earliest_expiry: Option<i64>,
    pub min_remaining_gib: Option<f64>,
    pub subscriptions: u32,
}

#[derive(Debug, Clone, Copy, Default)]
struct Userinfo {
    upload: u64,
    download: u64,
    total: u64,
    expire: i64,
}

impl UsageSummary {
    /// Folds one subscription's optional `Subscription-Userinfo` header.
    /// Absent or malformed headers only bump the subscription count.
    pub fn fold_header(&mut self, header: Option<&str>) {
        self.subscriptions += 1;
        let Some(info) = header.and_then(parse_userinfo) else {
            return;
        };

        self.upload += info.upload;
        self.download += info.download;
        self.total += info.total;

        if info.expire > 0 {
            self.earliest_expiry = Some(match self.earliest_expiry {
                Some(cur) => cur.min(info.expire),
                None => info.expire,
            });
        }

        let remaining =
            (info.total as f64 - info.upload as f64 - info.download as f64) / GIB;
        if remaining > 0.0 {
            self.min_remaining_gib = Some(match self.min_remaining_gib {
                Some(cur) => cur.min(remaining),
                None => remaining,
            });
        }
    }

    pub fn used_bytes(&self) -> u64 {
        self.upload + self.download
    }

    /// Machine-readable accounting header mirrored back to the client.
    pub fn userinfo_header(&self) -> String {
        format!(
            "upload={};download={};total={};expire={}",
            self.upload,
            self.download,
            self.total,
            self.earliest_expiry.unwrap_or(0)
        )
    }

    /// Human-readable comment placed at the top of the rendered document.
    pub fn banner(&self) -> String {
        let used = self.used_bytes() as f64 / GIB;
        let remaining = match self.min_remaining_gib {
            Some(r) => format!("{r:.1} GB"),
            None => "unknown".to_string(),
        };
        let expiry = match self.earliest_expiry.and_then(expiry_date) {
            Some(d) => d,
            None => "long-term".to_string(),
        };
        format!(
            "# traffic: used {used:.1} GB / min remaining {remaining} | expires: {expiry} | {} subscription(s)",
            self.subscriptions
        )
    }
}

fn expiry_date(epoch: i64) -> Option<String> {
    chrono::DateTime::from_timestamp(epoch, 0).map(|t| t.format("%Y-%m-%d").to_string())
}

/// Parses `upload=..;download=..;total=..;expire=..`. Unknown keys are
/// ignored, unparseable values count as zero. Returns `None` when no known
/// key is present at all.
fn parse_userinfo(header: &str) -> Option<Userinfo> {
    let mut info = Userinfo::default();
    let mut seen = false;
    for pair in header.split(';') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        match key {
            "upload" => {
                info.upload = value.parse().unwrap_or(0);
                seen = true;
            }
            "download" => {
                info.download = value.parse().unwrap_or(0);
                seen = true;
            }
            "total" => {
                info.total = value.parse().unwrap_or(0);
                seen = true;
            }
            "expire" => {
                info.expire = value.parse().unwrap_or(0);
                seen = true;
            }
            _ => {}
        }
    }
    seen.then_some(info)
}
