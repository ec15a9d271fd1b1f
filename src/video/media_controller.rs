// =============================================================================
// MEDIA CONTROLLER - FFMPEG BACKED MEDIA ELEMENT
// =============================================================================
//
// A single FFmpeg process decodes the video (stdout, rgb24) and the audio
// (stderr, f32le) from the current position. Reader threads fill a frame
// queue and an audio ring buffer; the playback thread releases frames against
// a clock that advances at the playback rate. Audio tempo follows the rate via
// the atempo filter, so any rate change restarts the process at the current
// position.
//
// =============================================================================

use std::collections::VecDeque;
use std::io::Read;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, ChildStdout, Command, Stdio};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, atomic::{AtomicBool, Ordering}};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use egui::{Context, TextureHandle};
use lru::LruCache;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};

use crate::core::ReviewError;
use crate::video::{MediaElement, MediaEvent, MediaProbe};

pub const FRAME_WIDTH: u32 = 854;
pub const FRAME_HEIGHT: u32 = 480;
const FRAME_BYTES: usize = (FRAME_WIDTH * FRAME_HEIGHT * 3) as usize;
const SAMPLE_RATE: u32 = 48000;
const CHANNELS: u16 = 2;
const MAX_QUEUED_FRAMES: usize = 120;
const PREVIEW_CACHE_SIZE: usize = 64;

/// Decoded rgb24 frame
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub rgb_data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: f64,
}

/// Locations of the FFmpeg executables
#[derive(Debug, Clone)]
pub struct MediaTools {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

// =============================================================================
// COMMANDS AND STATUS
// =============================================================================

/// Commands sent to the playback thread. `epoch` increases with every load and
/// seek so position updates from before a seek can be ignored.
#[derive(Debug)]
enum PlaybackCommand {
    SetSource { source: String, epoch: u64 },
    Play,
    Pause,
    Seek { position: f64, epoch: u64 },
    SetRate(f32),
    SetMuted(bool),
    Shutdown,
}

#[derive(Debug, Clone)]
enum PlaybackStatus {
    Loaded { duration: f64 },
    Playing,
    Paused,
    PositionUpdate { position: f64, epoch: u64 },
    Ended,
    Error(String),
}

// =============================================================================
// AUDIO SOURCE - Streams audio samples from a buffer
// =============================================================================

struct StreamingAudioSource {
    buffer: Arc<Mutex<AudioBuffer>>,
    stop_flag: Arc<AtomicBool>,
}

struct AudioBuffer {
    samples: Vec<f32>,
    read_pos: usize,
    write_pos: usize,
    capacity: usize,
}

impl AudioBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity],
            read_pos: 0,
            write_pos: 0,
            capacity,
        }
    }

    fn write(&mut self, data: &[f32]) -> usize {
        let mut written = 0;
        for &sample in data {
            let next_write = (self.write_pos + 1) % self.capacity;
            if next_write == self.read_pos {
                break; // Full
            }
            self.samples[self.write_pos] = sample;
            self.write_pos = next_write;
            written += 1;
        }
        written
    }

    fn read(&mut self) -> Option<f32> {
        if self.read_pos == self.write_pos {
            return None;
        }
        let sample = self.samples[self.read_pos];
        self.read_pos = (self.read_pos + 1) % self.capacity;
        Some(sample)
    }

    fn available(&self) -> usize {
        if self.write_pos >= self.read_pos {
            self.write_pos - self.read_pos
        } else {
            self.capacity - self.read_pos + self.write_pos
        }
    }

    fn free(&self) -> usize {
        self.capacity - 1 - self.available()
    }
}

impl Iterator for StreamingAudioSource {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stop_flag.load(Ordering::Relaxed) {
            return None;
        }

        // Silence while the reader catches up
        match self.buffer.lock() {
            Ok(mut buffer) => buffer.read().or(Some(0.0)),
            Err(_) => Some(0.0),
        }
    }
}

impl Source for StreamingAudioSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        CHANNELS
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

// =============================================================================
// PIPELINE - one running FFmpeg process and its readers
// =============================================================================

struct Pipeline {
    process: Child,
    stop_flag: Arc<AtomicBool>,
    video_handle: Option<JoinHandle<()>>,
    audio_handle: Option<JoinHandle<()>>,
    frames: Arc<Mutex<VecDeque<VideoFrame>>>,
    sink: Option<Sink>,
}

impl Pipeline {
    fn stop(mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }

        // Kill first so blocked reads return
        let _ = self.process.kill();
        let _ = self.process.wait();

        if let Some(handle) = self.video_handle.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.audio_handle.take() {
            let _ = handle.join();
        }
        log::debug!("FFmpeg pipeline stopped");
    }

    /// Newest frame whose timestamp has been reached; older due frames are dropped
    fn take_due_frames(&self, clock: f64) -> Option<VideoFrame> {
        let mut latest = None;
        if let Ok(mut frames) = self.frames.lock() {
            while frames.front().is_some_and(|f| f.timestamp <= clock) {
                latest = frames.pop_front();
            }
        }
        latest
    }

    fn set_muted(&self, muted: bool) {
        if let Some(sink) = &self.sink {
            sink.set_volume(if muted { 0.0 } else { 1.0 });
        }
    }
}

/// FFmpeg arguments for decoding from `start` at the given playback rate
fn playback_args(source: &str, start: f64, frame_rate: f64, rate: f32, with_audio: bool) -> Vec<String> {
    let mut args = vec![
        "-ss".to_string(), format!("{:.3}", start),
        "-i".to_string(), source.to_string(),
        "-map".to_string(), "0:v:0".to_string(),
        "-f".to_string(), "rawvideo".to_string(),
        "-pix_fmt".to_string(), "rgb24".to_string(),
        "-s".to_string(), format!("{}x{}", FRAME_WIDTH, FRAME_HEIGHT),
        "-r".to_string(), format!("{:.3}", frame_rate.min(60.0)), // Cap at 60 FPS
        "pipe:1".to_string(),
    ];

    if with_audio {
        args.extend(["-map".to_string(), "0:a:0".to_string()]);
        if (rate - 1.0).abs() > f32::EPSILON {
            args.extend(["-af".to_string(), format!("atempo={}", rate)]);
        }
        args.extend([
            "-f".to_string(), "f32le".to_string(),
            "-ac".to_string(), CHANNELS.to_string(),
            "-ar".to_string(), SAMPLE_RATE.to_string(),
            "pipe:2".to_string(),
        ]);
    }

    // Audio shares stderr, so FFmpeg must stay quiet
    args.extend(["-loglevel".to_string(), "quiet".to_string(), "-nostdin".to_string()]);
    args
}

/// Extract a single frame at a specific timestamp
fn extract_single_frame(ffmpeg: &Path, source: &str, timestamp: f64) -> Result<VideoFrame, String> {
    let output = Command::new(ffmpeg)
        .args([
            "-ss", &format!("{:.3}", timestamp),
            "-i", source,
            "-vframes", "1",
            "-f", "rawvideo",
            "-pix_fmt", "rgb24",
            "-s", &format!("{}x{}", FRAME_WIDTH, FRAME_HEIGHT),
            "-loglevel", "quiet",
            "-",
        ])
        .output()
        .map_err(|e| format!("FFmpeg execution failed: {}", e))?;

    if !output.status.success() {
        return Err("FFmpeg failed to extract frame".to_string());
    }

    if output.stdout.len() != FRAME_BYTES {
        return Err(format!("Unexpected frame size: {} (expected {})", output.stdout.len(), FRAME_BYTES));
    }

    Ok(VideoFrame {
        rgb_data: output.stdout,
        width: FRAME_WIDTH,
        height: FRAME_HEIGHT,
        timestamp,
    })
}

// =============================================================================
// PLAYBACK THREAD
// =============================================================================

struct PlaybackState {
    source: Option<String>,
    duration: f64,
    frame_rate: f64,
    has_audio: bool,
    position: f64,
    is_playing: bool,
    rate: f32,
    muted: bool,
    epoch: u64,
    playback_start_time: Option<Instant>,
    playback_start_position: f64,
    preview_cache: LruCache<u64, VideoFrame>,
}

impl PlaybackState {
    fn new() -> Self {
        Self {
            source: None,
            duration: 0.0,
            frame_rate: 30.0,
            has_audio: false,
            position: 0.0,
            is_playing: false,
            rate: 1.0,
            muted: false,
            epoch: 0,
            playback_start_time: None,
            playback_start_position: 0.0,
            preview_cache: LruCache::new(NonZeroUsize::new(PREVIEW_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN)),
        }
    }

    fn current_playback_position(&self) -> f64 {
        match (self.is_playing, self.playback_start_time) {
            (true, Some(start_time)) => {
                let elapsed = start_time.elapsed().as_secs_f64() * self.rate as f64;
                (self.playback_start_position + elapsed).min(self.duration)
            }
            _ => self.position,
        }
    }

    /// Frame for a paused seek, from the cache when possible
    fn preview_frame(&mut self, ffmpeg: &Path, timestamp: f64) -> Option<VideoFrame> {
        let key = (timestamp * 1000.0).round() as u64;
        if let Some(frame) = self.preview_cache.get(&key) {
            return Some(frame.clone());
        }

        let source = self.source.as_deref()?;
        match extract_single_frame(ffmpeg, source, timestamp) {
            Ok(frame) => {
                self.preview_cache.put(key, frame.clone());
                Some(frame)
            }
            Err(e) => {
                log::debug!("Preview frame at {:.3}s failed: {}", timestamp, e);
                None
            }
        }
    }
}

fn start_pipeline(
    tools: &MediaTools,
    state: &mut PlaybackState,
    stream_handle: Option<&OutputStreamHandle>,
) -> Result<Pipeline, String> {
    let source = state.source.clone().ok_or("No source loaded")?;
    let with_audio = state.has_audio && stream_handle.is_some();
    let args = playback_args(&source, state.position, state.frame_rate, state.rate, with_audio);

    let mut process = Command::new(&tools.ffmpeg)
        .args(&args)
        .stdout(Stdio::piped())
        .stderr(if with_audio { Stdio::piped() } else { Stdio::null() })
        .spawn()
        .map_err(|e| format!("Failed to spawn FFmpeg: {}", e))?;

    let stop_flag = Arc::new(AtomicBool::new(false));
    let frames = Arc::new(Mutex::new(VecDeque::new()));

    let video_handle = process.stdout.take().map(|stdout| {
        let stop = stop_flag.clone();
        let frames = frames.clone();
        let frame_rate = state.frame_rate.min(60.0);
        let start = state.position;
        thread::spawn(move || video_reader_thread(stdout, frames, stop, frame_rate, start))
    });

    let audio_buffer = Arc::new(Mutex::new(AudioBuffer::new(SAMPLE_RATE as usize * CHANNELS as usize * 2)));
    let audio_handle = if with_audio {
        process.stderr.take().map(|stderr| {
            let stop = stop_flag.clone();
            let buffer = audio_buffer.clone();
            thread::spawn(move || audio_reader_thread(stderr, buffer, stop))
        })
    } else {
        None
    };

    let sink = match stream_handle {
        Some(handle) if with_audio => match Sink::try_new(handle) {
            Ok(sink) => {
                sink.append(StreamingAudioSource {
                    buffer: audio_buffer,
                    stop_flag: stop_flag.clone(),
                });
                sink.set_volume(if state.muted { 0.0 } else { 1.0 });
                sink.play();
                Some(sink)
            }
            Err(e) => {
                log::warn!("Failed to create audio sink: {}", e);
                None
            }
        },
        _ => None,
    };

    state.is_playing = true;
    state.playback_start_time = Some(Instant::now());
    state.playback_start_position = state.position;

    log::info!("Playback started at {:.2}s (rate {}x, audio: {})", state.position, state.rate, sink.is_some());

    Ok(Pipeline {
        process,
        stop_flag,
        video_handle,
        audio_handle,
        frames,
        sink,
    })
}

fn playback_thread(
    tools: MediaTools,
    cmd_rx: mpsc::Receiver<PlaybackCommand>,
    status_tx: mpsc::Sender<PlaybackStatus>,
    frame_tx: mpsc::Sender<VideoFrame>,
) {
    let mut state = PlaybackState::new();

    let (_audio_stream, stream_handle) = match OutputStream::try_default() {
        Ok((stream, handle)) => (Some(stream), Some(handle)),
        Err(e) => {
            log::warn!("Failed to create audio output: {}. Video will play without audio.", e);
            (None, None)
        }
    };

    let mut pipeline: Option<Pipeline> = None;
    let mut deferred: Option<PlaybackCommand> = None;

    loop {
        let timeout = if state.is_playing {
            Duration::from_millis(8)
        } else {
            Duration::from_millis(50)
        };

        let command = match deferred.take() {
            Some(command) => Ok(command),
            None => cmd_rx.recv_timeout(timeout),
        };

        match command {
            Ok(PlaybackCommand::SetSource { source, epoch }) => {
                if let Some(p) = pipeline.take() {
                    p.stop();
                }
                state.preview_cache.clear();
                state.is_playing = false;
                state.playback_start_time = None;
                state.position = 0.0;
                state.epoch = epoch;

                log::info!("Probing media source {}", source);
                match MediaProbe::probe(&tools.ffprobe, &source) {
                    Ok(info) => {
                        log::info!("Media duration {:.2}s, {:.2} fps, audio: {}", info.duration, info.frame_rate, info.has_audio);
                        state.source = Some(source);
                        state.duration = info.duration;
                        state.frame_rate = info.frame_rate;
                        state.has_audio = info.has_audio;
                        let _ = status_tx.send(PlaybackStatus::Loaded { duration: info.duration });

                        if let Some(frame) = state.preview_frame(&tools.ffmpeg, 0.0) {
                            let _ = frame_tx.send(frame);
                        }
                    }
                    Err(e) => {
                        state.source = None;
                        state.duration = 0.0;
                        let _ = status_tx.send(PlaybackStatus::Error(e.to_string()));
                    }
                }
            }

            Ok(PlaybackCommand::Play) => {
                if state.source.is_none() || state.is_playing {
                    continue;
                }
                if state.position >= state.duration {
                    state.position = 0.0;
                }

                match start_pipeline(&tools, &mut state, stream_handle.as_ref()) {
                    Ok(p) => {
                        pipeline = Some(p);
                        let _ = status_tx.send(PlaybackStatus::Playing);
                    }
                    Err(e) => {
                        log::error!("Failed to start playback: {}", e);
                        let _ = status_tx.send(PlaybackStatus::Error(e));
                    }
                }
            }

            Ok(PlaybackCommand::Pause) => {
                if !state.is_playing {
                    continue;
                }
                state.position = state.current_playback_position();
                state.is_playing = false;
                state.playback_start_time = None;
                if let Some(p) = pipeline.take() {
                    p.stop();
                }
                log::info!("Paused at {:.2}s", state.position);
                let _ = status_tx.send(PlaybackStatus::Paused);
            }

            Ok(PlaybackCommand::Seek { mut position, mut epoch }) => {
                // Only the newest of a burst of scrub seeks matters
                loop {
                    match cmd_rx.try_recv() {
                        Ok(PlaybackCommand::Seek { position: p, epoch: e }) => {
                            position = p;
                            epoch = e;
                        }
                        Ok(other) => {
                            deferred = Some(other);
                            break;
                        }
                        Err(_) => break,
                    }
                }

                let clamped = position.clamp(0.0, state.duration);
                log::debug!("Seeking to {:.2}s", clamped);
                state.epoch = epoch;

                let was_playing = state.is_playing;
                if let Some(p) = pipeline.take() {
                    p.stop();
                }
                state.is_playing = false;
                state.playback_start_time = None;
                state.position = clamped;

                if was_playing {
                    match start_pipeline(&tools, &mut state, stream_handle.as_ref()) {
                        Ok(p) => pipeline = Some(p),
                        Err(e) => {
                            log::error!("Failed to restart FFmpeg after seek: {}", e);
                            let _ = status_tx.send(PlaybackStatus::Error(e));
                        }
                    }
                } else if let Some(frame) = state.preview_frame(&tools.ffmpeg, clamped) {
                    let _ = frame_tx.send(frame);
                }

                let _ = status_tx.send(PlaybackStatus::PositionUpdate { position: clamped, epoch: state.epoch });
            }

            Ok(PlaybackCommand::SetRate(rate)) => {
                if (state.rate - rate).abs() <= f32::EPSILON {
                    continue;
                }
                log::info!("Playback rate {}x", rate);

                if state.is_playing {
                    state.position = state.current_playback_position();
                    if let Some(p) = pipeline.take() {
                        p.stop();
                    }
                    state.is_playing = false;
                    state.rate = rate;
                    match start_pipeline(&tools, &mut state, stream_handle.as_ref()) {
                        Ok(p) => pipeline = Some(p),
                        Err(e) => {
                            log::error!("Failed to restart FFmpeg after rate change: {}", e);
                            let _ = status_tx.send(PlaybackStatus::Error(e));
                        }
                    }
                } else {
                    state.rate = rate;
                }
            }

            Ok(PlaybackCommand::SetMuted(muted)) => {
                state.muted = muted;
                if let Some(p) = &pipeline {
                    p.set_muted(muted);
                }
            }

            Ok(PlaybackCommand::Shutdown) => {
                log::info!("Playback thread shutting down");
                break;
            }

            Err(mpsc::RecvTimeoutError::Timeout) => {
                if !state.is_playing {
                    continue;
                }

                let current_time = state.current_playback_position();
                if current_time >= state.duration {
                    state.position = state.duration;
                    state.is_playing = false;
                    state.playback_start_time = None;
                    if let Some(p) = pipeline.take() {
                        p.stop();
                    }
                    log::info!("Reached end of media");
                    let _ = status_tx.send(PlaybackStatus::PositionUpdate { position: state.duration, epoch: state.epoch });
                    let _ = status_tx.send(PlaybackStatus::Ended);
                    continue;
                }

                if let Some(frame) = pipeline.as_ref().and_then(|p| p.take_due_frames(current_time)) {
                    let _ = frame_tx.send(frame);
                }

                let _ = status_tx.send(PlaybackStatus::PositionUpdate { position: current_time, epoch: state.epoch });
            }

            Err(mpsc::RecvTimeoutError::Disconnected) => {
                log::info!("Command channel disconnected, shutting down");
                break;
            }
        }
    }

    if let Some(p) = pipeline.take() {
        p.stop();
    }
    log::info!("Playback thread exited");
}

fn video_reader_thread(
    mut stdout: ChildStdout,
    frames: Arc<Mutex<VecDeque<VideoFrame>>>,
    stop_flag: Arc<AtomicBool>,
    frame_rate: f64,
    start_position: f64,
) {
    let frame_duration = 1.0 / frame_rate;
    let mut frame_index = 0u64;

    log::debug!("Video reader started (fps: {:.2})", frame_rate);

    while !stop_flag.load(Ordering::Relaxed) {
        let mut buffer = vec![0u8; FRAME_BYTES];
        if let Err(e) = stdout.read_exact(&mut buffer) {
            if e.kind() != std::io::ErrorKind::UnexpectedEof {
                log::debug!("Video reader error: {}", e);
            }
            break;
        }

        let frame = VideoFrame {
            rgb_data: buffer,
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            timestamp: start_position + frame_index as f64 * frame_duration,
        };
        frame_index += 1;

        // Back-pressure instead of dropping frames
        loop {
            if stop_flag.load(Ordering::Relaxed) {
                return;
            }
            match frames.lock() {
                Ok(mut queue) if queue.len() < MAX_QUEUED_FRAMES => {
                    queue.push_back(frame);
                    break;
                }
                Ok(_) => {}
                Err(_) => return,
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    log::debug!("Video reader stopped (read {} frames)", frame_index);
}

fn audio_reader_thread(
    mut stderr: ChildStderr,
    audio_buffer: Arc<Mutex<AudioBuffer>>,
    stop_flag: Arc<AtomicBool>,
) {
    let mut byte_buffer = vec![0u8; 4096];
    let mut pending: Vec<u8> = Vec::new();
    let mut total_samples = 0u64;

    log::debug!("Audio reader started");

    while !stop_flag.load(Ordering::Relaxed) {
        match stderr.read(&mut byte_buffer) {
            Ok(0) => break,
            Ok(bytes_read) => {
                pending.extend_from_slice(&byte_buffer[..bytes_read]);
                let whole = pending.len() / 4 * 4;
                let mut samples: Vec<f32> = pending[..whole]
                    .chunks_exact(4)
                    .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                    .collect();
                pending.drain(..whole);
                total_samples += samples.len() as u64;

                // Wait for the sink to drain rather than overwrite unplayed audio
                while !samples.is_empty() {
                    if stop_flag.load(Ordering::Relaxed) {
                        return;
                    }
                    let written = match audio_buffer.lock() {
                        Ok(mut buffer) => {
                            let n = samples.len().min(buffer.free());
                            buffer.write(&samples[..n])
                        }
                        Err(_) => return,
                    };
                    samples.drain(..written);
                    if !samples.is_empty() {
                        thread::sleep(Duration::from_millis(5));
                    }
                }
            }
            Err(e) => {
                if e.kind() != std::io::ErrorKind::WouldBlock {
                    log::debug!("Audio reader error: {}", e);
                }
                break;
            }
        }
    }

    log::debug!("Audio reader stopped (read {} samples)", total_samples);
}

// =============================================================================
// MEDIA CONTROLLER - PUBLIC API
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum MediaControllerState {
    Unloaded,
    Loading,
    Ready,
    Playing,
    Paused,
    Error(String),
}

impl MediaControllerState {
    pub fn is_busy(&self) -> bool {
        matches!(self, MediaControllerState::Loading)
    }

    pub fn display_text(&self) -> &str {
        match self {
            MediaControllerState::Unloaded => "No video loaded",
            MediaControllerState::Loading => "Loading video...",
            MediaControllerState::Ready => "Ready",
            MediaControllerState::Playing => "Playing",
            MediaControllerState::Paused => "Paused",
            MediaControllerState::Error(msg) => msg.as_str(),
        }
    }
}

pub struct MediaController {
    command_sender: mpsc::Sender<PlaybackCommand>,
    status_receiver: mpsc::Receiver<PlaybackStatus>,
    frame_receiver: mpsc::Receiver<VideoFrame>,
    thread_handle: Option<JoinHandle<()>>,

    state: MediaControllerState,
    current_position: f64,
    duration: Option<f64>,
    epoch: u64,

    latest_frame: Option<VideoFrame>,
    texture_handle: Option<TextureHandle>,
}

impl MediaController {
    pub fn new(tools: MediaTools) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (status_tx, status_rx) = mpsc::channel();
        let (frame_tx, frame_rx) = mpsc::channel();

        let thread_handle = thread::spawn(move || {
            playback_thread(tools, cmd_rx, status_tx, frame_tx);
        });

        Self {
            command_sender: cmd_tx,
            status_receiver: status_rx,
            frame_receiver: frame_rx,
            thread_handle: Some(thread_handle),
            state: MediaControllerState::Unloaded,
            current_position: 0.0,
            duration: None,
            epoch: 0,
            latest_frame: None,
            texture_handle: None,
        }
    }

    fn send(&self, command: PlaybackCommand) {
        if let Err(e) = self.command_sender.send(command) {
            log::error!("Playback thread is gone: {}", e);
        }
    }

    pub fn state(&self) -> &MediaControllerState {
        &self.state
    }

    /// Upload the newest decoded frame and return the video texture
    pub fn frame_texture(&mut self, ctx: &Context) -> Option<&TextureHandle> {
        if let Some(frame) = self.latest_frame.take() {
            let image = egui::ColorImage::from_rgb(
                [frame.width as usize, frame.height as usize],
                &frame.rgb_data,
            );
            match &mut self.texture_handle {
                Some(handle) => handle.set(image, egui::TextureOptions::LINEAR),
                None => {
                    self.texture_handle = Some(ctx.load_texture("video_frame", image, egui::TextureOptions::LINEAR));
                }
            }
        }
        self.texture_handle.as_ref()
    }
}

impl MediaElement for MediaController {
    fn load(&mut self, source: &str) {
        self.epoch += 1;
        self.state = MediaControllerState::Loading;
        self.current_position = 0.0;
        self.duration = None;
        self.latest_frame = None;
        self.texture_handle = None;
        self.send(PlaybackCommand::SetSource {
            source: source.to_string(),
            epoch: self.epoch,
        });
    }

    fn play(&mut self) {
        self.send(PlaybackCommand::Play);
    }

    fn pause(&mut self) {
        self.send(PlaybackCommand::Pause);
    }

    fn current_time(&self) -> f64 {
        self.current_position
    }

    fn set_current_time(&mut self, seconds: f64) {
        let clamped = match self.duration {
            Some(duration) => seconds.clamp(0.0, duration),
            None => seconds.max(0.0),
        };
        self.epoch += 1;
        self.current_position = clamped;
        self.send(PlaybackCommand::Seek {
            position: clamped,
            epoch: self.epoch,
        });
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn set_playback_rate(&mut self, rate: f32) {
        self.send(PlaybackCommand::SetRate(rate));
    }

    fn set_muted(&mut self, muted: bool) {
        self.send(PlaybackCommand::SetMuted(muted));
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        let mut events = Vec::new();

        while let Ok(status) = self.status_receiver.try_recv() {
            match status {
                PlaybackStatus::Loaded { duration } => {
                    self.duration = Some(duration);
                    self.state = MediaControllerState::Ready;
                    events.push(MediaEvent::Loaded { duration });
                }
                PlaybackStatus::Playing => {
                    self.state = MediaControllerState::Playing;
                }
                PlaybackStatus::Paused => {
                    self.state = MediaControllerState::Paused;
                }
                PlaybackStatus::PositionUpdate { position, epoch } => {
                    // Updates from before the latest seek would jump the playhead back
                    if epoch == self.epoch {
                        self.current_position = position;
                        events.push(MediaEvent::TimeUpdate);
                    }
                }
                PlaybackStatus::Ended => {
                    self.state = MediaControllerState::Paused;
                    events.push(MediaEvent::Ended);
                }
                PlaybackStatus::Error(msg) => {
                    self.state = MediaControllerState::Error(msg.clone());
                    events.push(MediaEvent::Error(ReviewError::Media(msg)));
                }
            }
        }

        // Only the latest frame is shown
        while let Ok(frame) = self.frame_receiver.try_recv() {
            self.latest_frame = Some(frame);
        }

        events
    }
}

impl Drop for MediaController {
    fn drop(&mut self) {
        log::debug!("MediaController dropping");
        let _ = self.command_sender.send(PlaybackCommand::Shutdown);

        if let Some(handle) = self.thread_handle.take() {
            for _ in 0..10 {
                if handle.is_finished() {
                    let _ = handle.join();
                    return;
                }
                thread::sleep(Duration::from_millis(100));
            }
            log::warn!("Playback thread did not shut down cleanly");
        }
    }
}
